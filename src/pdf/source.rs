//! Reading card pages from the source PDF

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::canvas::Rotation;
use crate::error::{Error, Result};
use crate::layout::CardSize;

/// Visible page area in PDF user space (bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// Width and height as a viewer shows the page under `rotation`
    pub fn display_size(&self, rotation: Rotation) -> (f64, f64) {
        if rotation.is_sideways() {
            (self.height(), self.width())
        } else {
            (self.width(), self.height())
        }
    }
}

/// A loaded source PDF with its pages in document order
pub struct SourceDocument {
    path: PathBuf,
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl SourceDocument {
    /// Load a PDF and enumerate its pages
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let doc = Document::load(path)?;
        // get_pages() is keyed by 1-based page number, so values come out in order
        let page_ids = doc.get_pages().into_values().collect();

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            page_ids,
        })
    }

    /// Wrap an already loaded document
    pub fn from_document(doc: Document) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self {
            path: PathBuf::new(),
            doc,
            page_ids,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or(Error::PageOutOfRange {
            index,
            count: self.page_ids.len(),
        })
    }

    /// Card size is the upright size of the first page
    pub fn card_size(&self) -> Result<CardSize> {
        if self.page_ids.is_empty() {
            return Err(Error::EmptyPdf(self.path.clone()));
        }

        let (width, height) = self.page_box(0)?.display_size(self.page_rotation(0)?);
        Ok(CardSize::from_pt(width, height))
    }

    /// The page's /Rotate, following inheritance
    pub fn page_rotation(&self, index: usize) -> Result<Rotation> {
        let page_id = self.page_id(index)?;

        match self.inherited(page_id, b"Rotate").and_then(extract_number) {
            Some(degrees) => Rotation::from_degrees(degrees as i64),
            None => Ok(Rotation::None),
        }
    }

    /// The page's CropBox, or MediaBox when there is none, following inheritance
    pub fn page_box(&self, index: usize) -> Result<PageBox> {
        let page_id = self.page_id(index)?;

        let boxed = self
            .inherited(page_id, b"CropBox")
            .and_then(|obj| self.parse_box(obj))
            .or_else(|| {
                self.inherited(page_id, b"MediaBox")
                    .and_then(|obj| self.parse_box(obj))
            });

        boxed.ok_or_else(|| {
            Error::General(format!("Page {} has no usable MediaBox", index + 1))
        })
    }

    /// The page's Resources dictionary, following inheritance
    pub fn page_resources(&self, index: usize) -> Result<Option<&Object>> {
        let page_id = self.page_id(index)?;
        Ok(self.inherited(page_id, b"Resources"))
    }

    /// All content streams of a page, decoded and concatenated
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>> {
        let page_id = self.page_id(index)?;
        let page = self.doc.get_dictionary(page_id)?;

        let contents = match page.get(b"Contents") {
            Ok(obj) => self.resolve(obj),
            Err(_) => return Ok(Vec::new()),
        };

        let mut result = Vec::new();
        match contents {
            Object::Array(arr) => {
                for obj in arr {
                    if let Object::Stream(stream) = self.resolve(obj) {
                        result.extend_from_slice(&stream_bytes(stream));
                        result.push(b'\n');
                    }
                }
            }
            Object::Stream(stream) => result = stream_bytes(stream),
            _ => {}
        }

        Ok(result)
    }

    /// Follow a reference to the object it points at
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Look up a page attribute on the page or, failing that, its ancestors
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current: &Dictionary = self.doc.get_dictionary(page_id).ok()?;

        // Bounded in case of a cyclic Parent chain
        for _ in 0..64 {
            if let Ok(obj) = current.get(key) {
                return Some(self.resolve(obj));
            }
            match current.get(b"Parent") {
                Ok(Object::Reference(parent)) => {
                    current = self.doc.get_dictionary(*parent).ok()?;
                }
                _ => return None,
            }
        }
        None
    }

    fn parse_box(&self, obj: &Object) -> Option<PageBox> {
        let arr = obj.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }

        let mut nums = [0.0; 4];
        for (slot, item) in nums.iter_mut().zip(arr) {
            *slot = extract_number(self.resolve(item))?;
        }

        let page_box = PageBox {
            llx: nums[0].min(nums[2]),
            lly: nums[1].min(nums[3]),
            urx: nums[0].max(nums[2]),
            ury: nums[1].max(nums[3]),
        };

        if page_box.width() > 0.0 && page_box.height() > 0.0 {
            Some(page_box)
        } else {
            None
        }
    }
}

fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    // Fall back to the raw bytes when the stream is not compressed
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

pub(crate) fn extract_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Two-level page tree: MediaBox on the Pages node, CropBox on page 2
    fn sample() -> SourceDocument {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 10 10 re f".to_vec()));
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "CropBox" => Object::Array(vec![
                Object::Integer(10),
                Object::Integer(20),
                Object::Integer(110),
                Object::Integer(220),
            ]),
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Object::Array(vec![Object::Reference(first), Object::Reference(second)]),
                "Count" => Object::Integer(2),
                "MediaBox" => Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(216),
                    Object::Real(360.0),
                ]),
                "Resources" => Dictionary::new(),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        SourceDocument::from_document(doc)
    }

    #[test]
    fn test_open_nonexistent_file() {
        let result = SourceDocument::open(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_inherited_media_box() {
        let source = sample();
        assert_eq!(source.page_count(), 2);

        let card = source.card_size().unwrap();
        assert_eq!(card, CardSize::from_pt(216.0, 360.0));
        assert!(source.page_resources(0).unwrap().is_some());
    }

    #[test]
    fn test_rotated_pages_swap_card_size() {
        let mut source = sample();
        let pages_id = source.doc.catalog().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
        source
            .doc
            .get_dictionary_mut(pages_id)
            .unwrap()
            .set("Rotate", Object::Integer(90));

        assert_eq!(source.page_rotation(0).unwrap(), Rotation::Quarter);
        assert_eq!(source.card_size().unwrap(), CardSize::from_pt(360.0, 216.0));
    }

    #[test]
    fn test_unrotated_page() {
        let source = sample();
        assert_eq!(source.page_rotation(1).unwrap(), Rotation::None);
    }

    #[test]
    fn test_crop_box_preferred() {
        let source = sample();
        let page_box = source.page_box(1).unwrap();

        assert_eq!(page_box, PageBox { llx: 10.0, lly: 20.0, urx: 110.0, ury: 220.0 });
    }

    #[test]
    fn test_page_content() {
        let source = sample();
        assert_eq!(source.page_content(0).unwrap(), b"0 0 10 10 re f".to_vec());
        assert!(source.page_content(1).unwrap().is_empty());
        assert!(matches!(
            source.page_content(2),
            Err(Error::PageOutOfRange { index: 2, count: 2 })
        ));
    }
}
