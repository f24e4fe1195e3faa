//! lopdf-backed document canvas
//!
//! Source pages are turned into Form XObjects once each and drawn into cells
//! with a `cm` transform. Sheets are buffered in memory and only turned into a
//! page tree when [`PdfCanvas::save`] runs.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::debug;
use tempfile::NamedTempFile;

use crate::canvas::{DocumentCanvas, Point, Rotation, SheetId};
use crate::cut::LineStyle;
use crate::error::{Error, Result};
use crate::layout::{Rect, SheetSize};
use crate::pdf::source::{PageBox, SourceDocument};

/// One output page under construction
struct SheetBuilder {
    size: SheetSize,
    rotation: Rotation,
    content: String,
    xobjects: Dictionary,
    graphics_states: Dictionary,
}

impl SheetBuilder {
    /// Convert a top-left-origin y coordinate to PDF user space
    fn flip_y(&self, y: f64) -> f64 {
        self.size.height.pt() - y
    }
}

/// Canvas that writes a new PDF, embedding pages from one source document
pub struct PdfCanvas<'a> {
    source: &'a SourceDocument,
    output: Document,
    sheets: Vec<SheetBuilder>,
    /// Source page index -> Form XObject in the output
    forms: HashMap<usize, ObjectId>,
    /// Source object -> copied object in the output
    copied: HashMap<ObjectId, ObjectId>,
    /// Stroke opacity bits -> (resource name, ExtGState object)
    opacity_states: HashMap<u64, (String, ObjectId)>,
}

impl<'a> PdfCanvas<'a> {
    pub fn new(source: &'a SourceDocument) -> Self {
        Self {
            source,
            output: Document::with_version("1.5"),
            sheets: Vec::new(),
            forms: HashMap::new(),
            copied: HashMap::new(),
            opacity_states: HashMap::new(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Assemble the page tree and return the finished document
    pub fn into_document(mut self) -> Result<Document> {
        let pages_id = self.output.new_object_id();
        let mut kids = Vec::with_capacity(self.sheets.len());

        for sheet in std::mem::take(&mut self.sheets) {
            let content_id = self
                .output
                .add_object(Stream::new(Dictionary::new(), sheet.content.into_bytes()));

            let mut resources = Dictionary::new();
            resources.set("XObject", Object::Dictionary(sheet.xobjects));
            resources.set("ExtGState", Object::Dictionary(sheet.graphics_states));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(sheet.size.width.pt() as f32),
                    Object::Real(sheet.size.height.pt() as f32),
                ]),
            );
            page.set("Resources", Object::Dictionary(resources));
            page.set("Contents", Object::Reference(content_id));
            if sheet.rotation != Rotation::None {
                page.set("Rotate", Object::Integer(sheet.rotation.degrees()));
            }

            kids.push(Object::Reference(self.output.add_object(page)));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        self.output.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = self.output.add_object(catalog);
        self.output.trailer.set("Root", Object::Reference(catalog_id));

        self.output.compress();
        Ok(self.output)
    }

    /// Write the document to `path`.
    ///
    /// The bytes go to a temporary file next to `path` which is renamed into
    /// place only once it is complete.
    pub fn save(self, path: &Path) -> Result<()> {
        let mut doc = self.into_document()?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        doc.save_to(&mut temp)?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        Ok(())
    }

    fn sheet_mut(&mut self, sheet: SheetId) -> Result<&mut SheetBuilder> {
        let count = self.sheets.len();
        self.sheets
            .get_mut(sheet.0)
            .ok_or(Error::PageOutOfRange { index: sheet.0, count })
    }

    /// Form XObject for a source page, created on first use
    fn form_for(&mut self, source_page: usize) -> Result<ObjectId> {
        if let Some(&id) = self.forms.get(&source_page) {
            return Ok(id);
        }

        let page_box = self.source.page_box(source_page)?;
        let content = self.source.page_content(source_page)?;

        let mut form = Dictionary::new();
        form.set("Type", Object::Name(b"XObject".to_vec()));
        form.set("Subtype", Object::Name(b"Form".to_vec()));
        form.set("FormType", Object::Integer(1));
        form.set(
            "BBox",
            Object::Array(vec![
                Object::Real(page_box.llx as f32),
                Object::Real(page_box.lly as f32),
                Object::Real(page_box.urx as f32),
                Object::Real(page_box.ury as f32),
            ]),
        );

        let resources = self.source.page_resources(source_page)?.cloned();
        if let Some(resources) = resources {
            let copied = self.copy_object(&resources)?;
            form.set("Resources", copied);
        }

        let id = self.output.add_object(Stream::new(form, content));
        debug!("Source page {} embedded as form {:?}", source_page + 1, id);
        self.forms.insert(source_page, id);
        Ok(id)
    }

    /// Deep copy an object from the source, following references.
    ///
    /// Ids are reserved before recursing so reference cycles terminate.
    fn copy_object(&mut self, obj: &Object) -> Result<Object> {
        match obj {
            Object::Reference(id) => {
                if let Some(&new_id) = self.copied.get(id) {
                    return Ok(Object::Reference(new_id));
                }

                let new_id = self.output.new_object_id();
                self.copied.insert(*id, new_id);

                let referenced = self.source.document().get_object(*id)?.clone();
                let copy = self.copy_object(&referenced)?;
                self.output.objects.insert(new_id, copy);

                Ok(Object::Reference(new_id))
            }
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.copy_dictionary(dict)?)),
            Object::Array(arr) => {
                let mut items = Vec::with_capacity(arr.len());
                for item in arr {
                    items.push(self.copy_object(item)?);
                }
                Ok(Object::Array(items))
            }
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(&stream.dict)?;
                copy.start_position = None;
                Ok(Object::Stream(copy))
            }
            _ => Ok(obj.clone()),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Result<Dictionary> {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            // Never drag the source page tree along
            if key.as_slice() == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.copy_object(value)?);
        }
        Ok(copy)
    }

    /// ExtGState resource name for a stroke opacity, shared across sheets
    fn opacity_state(&mut self, opacity: f64) -> (String, ObjectId) {
        let key = opacity.to_bits();
        if let Some(state) = self.opacity_states.get(&key) {
            return state.clone();
        }

        let mut gs = Dictionary::new();
        gs.set("Type", Object::Name(b"ExtGState".to_vec()));
        gs.set("CA", Object::Real(opacity as f32));
        let id = self.output.add_object(gs);
        let name = format!("GS{}", self.opacity_states.len());

        self.opacity_states.insert(key, (name.clone(), id));
        (name, id)
    }
}

impl DocumentCanvas for PdfCanvas<'_> {
    fn new_page(&mut self, size: SheetSize) -> Result<SheetId> {
        self.sheets.push(SheetBuilder {
            size,
            rotation: Rotation::None,
            content: String::new(),
            xobjects: Dictionary::new(),
            graphics_states: Dictionary::new(),
        });
        Ok(SheetId(self.sheets.len() - 1))
    }

    fn embed_page(&mut self, sheet: SheetId, source_page: usize, rect: Rect) -> Result<()> {
        self.sheet_mut(sheet)?;
        let page_box = self.source.page_box(source_page)?;
        let rotation = self.source.page_rotation(source_page)?;
        let form_id = self.form_for(source_page)?;

        let builder = self.sheet_mut(sheet)?;
        let name = format!("P{}", source_page);
        builder.xobjects.set(name.as_bytes(), Object::Reference(form_id));

        let bottom = builder.flip_y(rect.y1);
        let matrix = placement_matrix(&page_box, rotation, rect, bottom);
        let matrix: Vec<String> = matrix.iter().map(|v| num(*v)).collect();

        builder
            .content
            .push_str(&format!("q {} cm /{} Do Q\n", matrix.join(" "), name));
        Ok(())
    }

    fn set_rotation(&mut self, sheet: SheetId, rotation: Rotation) -> Result<()> {
        self.sheet_mut(sheet)?.rotation = rotation;
        Ok(())
    }

    fn draw_line(&mut self, sheet: SheetId, from: Point, to: Point, style: &LineStyle) -> Result<()> {
        self.sheet_mut(sheet)?;
        let (gs_name, gs_id) = self.opacity_state(style.opacity);

        let builder = self.sheet_mut(sheet)?;
        builder
            .graphics_states
            .set(gs_name.as_bytes(), Object::Reference(gs_id));

        let dashes: Vec<String> = style.dashes.iter().map(|d| num(*d)).collect();
        let [r, g, b] = style.color;
        let (from_y, to_y) = (builder.flip_y(from.y), builder.flip_y(to.y));
        builder.content.push_str(&format!(
            "q /{} gs {} {} {} RG {} w [{}] 0 d {} {} m {} {} l S Q\n",
            gs_name,
            num(r),
            num(g),
            num(b),
            num(style.width),
            dashes.join(" "),
            num(from.x),
            num(from_y),
            num(to.x),
            num(to_y),
        ));
        Ok(())
    }
}

/// `cm` operands that draw a page box upright and stretched over `rect`.
///
/// `bottom` is the PDF y coordinate of the cell's lower edge. The page's own
/// display rotation is undone so the card reads the way a viewer shows it.
fn placement_matrix(page_box: &PageBox, rotation: Rotation, rect: Rect, bottom: f64) -> [f64; 6] {
    let (width, height) = page_box.display_size(rotation);
    let sx = rect.width() / width;
    let sy = rect.height() / height;
    let x0 = rect.x0;

    match rotation {
        Rotation::None => [sx, 0.0, 0.0, sy, x0 - sx * page_box.llx, bottom - sy * page_box.lly],
        Rotation::Quarter => [0.0, -sy, sx, 0.0, x0 - sx * page_box.lly, bottom + sy * page_box.urx],
        Rotation::Half => [-sx, 0.0, 0.0, -sy, x0 + sx * page_box.urx, bottom + sy * page_box.ury],
        Rotation::ThreeQuarters => {
            [0.0, sy, -sx, 0.0, x0 + sx * page_box.ury, bottom - sy * page_box.llx]
        }
    }
}

/// Format a number for a content stream: at most four decimals, no trailing zeros
fn num(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Length;
    use lopdf::dictionary;

    fn one_card_source() -> SourceDocument {
        card_source(200, 100, None)
    }

    fn card_source(width: i64, height: i64, rotate: Option<i64>) -> SourceDocument {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 10 10 Td (Front) Tj ET".to_vec(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ]),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        if let Some(degrees) = rotate {
            page.set("Rotate", Object::Integer(degrees));
        }
        let page_id = doc.add_object(page);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Object::Array(vec![Object::Reference(page_id)]),
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        SourceDocument::from_document(doc)
    }

    fn small_sheet() -> SheetSize {
        SheetSize {
            width: Length::from_pt(500.0),
            height: Length::from_pt(400.0),
        }
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-72.0), "-72");
        assert_eq!(num(1.0 / 3.0), "0.3333");
        assert_eq!(num(-0.00001), "0");
    }

    #[test]
    fn test_embed_writes_flipped_transform() {
        let source = one_card_source();
        let mut canvas = PdfCanvas::new(&source);
        let sheet = canvas.new_page(small_sheet()).unwrap();

        // Cell at the top-left, twice the source size
        canvas.embed_page(sheet, 0, Rect::new(10.0, 20.0, 400.0, 200.0)).unwrap();

        let content = &canvas.sheets[0].content;
        assert_eq!(content, "q 2 0 0 2 10 180 cm /P0 Do Q\n");
    }

    #[test]
    fn test_embed_undoes_source_rotation() {
        // Landscape MediaBox shown as a portrait card
        let source = card_source(360, 216, Some(90));
        let mut canvas = PdfCanvas::new(&source);
        let sheet = canvas.new_page(small_sheet()).unwrap();

        canvas.embed_page(sheet, 0, Rect::new(0.0, 0.0, 216.0, 360.0)).unwrap();
        assert_eq!(canvas.sheets[0].content, "q 0 -1 1 0 0 400 cm /P0 Do Q\n");
    }

    #[test]
    fn test_placement_matrix_maps_box_corners() {
        let page_box = PageBox { llx: 0.0, lly: 0.0, urx: 360.0, ury: 216.0 };
        let rect = Rect::new(10.0, 0.0, 108.0, 180.0);
        let apply = |m: [f64; 6], u: f64, v: f64| (m[0] * u + m[2] * v + m[4], m[1] * u + m[3] * v + m[5]);

        // Top-left corner of the page as displayed lands on the cell's top-left
        let m = placement_matrix(&page_box, Rotation::Quarter, rect, 20.0);
        assert_eq!(apply(m, 0.0, 0.0), (10.0, 200.0));
        assert_eq!(apply(m, 360.0, 216.0), (118.0, 20.0));

        let m = placement_matrix(&page_box, Rotation::ThreeQuarters, rect, 20.0);
        assert_eq!(apply(m, 360.0, 216.0), (10.0, 200.0));
        assert_eq!(apply(m, 0.0, 0.0), (118.0, 20.0));

        let wide = Rect::new(10.0, 0.0, 180.0, 108.0);
        let m = placement_matrix(&page_box, Rotation::Half, wide, 20.0);
        assert_eq!(apply(m, 360.0, 216.0), (10.0, 20.0));
        assert_eq!(apply(m, 0.0, 0.0), (190.0, 128.0));
    }

    #[test]
    fn test_forms_are_shared() {
        let source = one_card_source();
        let mut canvas = PdfCanvas::new(&source);
        let first = canvas.new_page(small_sheet()).unwrap();
        let second = canvas.new_page(small_sheet()).unwrap();

        canvas.embed_page(first, 0, Rect::new(0.0, 0.0, 200.0, 100.0)).unwrap();
        canvas.embed_page(second, 0, Rect::new(0.0, 0.0, 200.0, 100.0)).unwrap();

        assert_eq!(canvas.forms.len(), 1);
        // The font was copied once
        assert_eq!(canvas.copied.len(), 1);
    }

    #[test]
    fn test_unknown_sheet() {
        let source = one_card_source();
        let mut canvas = PdfCanvas::new(&source);
        let result = canvas.set_rotation(SheetId(3), Rotation::Half);
        assert!(matches!(result, Err(Error::PageOutOfRange { index: 3, count: 0 })));
    }

    #[test]
    fn test_document_structure() {
        let source = one_card_source();
        let mut canvas = PdfCanvas::new(&source);
        let front = canvas.new_page(small_sheet()).unwrap();
        let back = canvas.new_page(small_sheet()).unwrap();
        canvas.embed_page(front, 0, Rect::new(0.0, 0.0, 200.0, 100.0)).unwrap();
        canvas
            .draw_line(front, Point::new(0.0, 0.0), Point::new(200.0, 0.0), &LineStyle::cut_outline())
            .unwrap();
        canvas.set_rotation(back, Rotation::Half).unwrap();
        assert_eq!(canvas.sheet_count(), 2);

        let doc = canvas.into_document().unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let back_page = doc.get_dictionary(pages[&2]).unwrap();
        assert_eq!(back_page.get(b"Rotate").unwrap().as_i64().unwrap(), 180);

        let front_page = doc.get_dictionary(pages[&1]).unwrap();
        assert!(front_page.get(b"Rotate").is_err());
        let resources = front_page.get(b"Resources").unwrap().as_dict().unwrap();
        assert_eq!(resources.get(b"XObject").unwrap().as_dict().unwrap().len(), 1);
        assert_eq!(resources.get(b"ExtGState").unwrap().as_dict().unwrap().len(), 1);
    }
}
