//! Indexed reader for an extracted RaspberrySet directory tree.
//!
//! A dataset root contains a `classes.txt` catalog plus paired
//! `<stem>.JPEG` / `<stem>.txt` files, where each label file holds one
//! `<class_idx> <center_x> <center_y> <width> <height>` row per
//! annotated object. The reader flattens every label row across the
//! tree into one positional index and serves decoded image tensors by
//! row position.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use walkdir::WalkDir;

use crate::error::RaspberrySetError;

const IMAGE_EXTENSION: &str = "JPEG";
const CLASS_CATALOG_FILE: &str = "classes.txt";

/// Optional hook applied to the decoded tensor before a sample is
/// returned. Absence means identity.
pub type Transform = Box<dyn Fn(Array3<f32>) -> Array3<f32>>;

/// One labeled object instance. Bounding-box geometry is normalized,
/// center-based, relative to the image dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub filepath: PathBuf,
    pub class_idx: i64,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

/// The triple returned by [`RaspberrySet::get`]. `inputs` is a
/// channel-first `(3, H, W)` RGB tensor with intensities in
/// `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub inputs: Array3<f32>,
    pub targets: i64,
    pub idx: usize,
}

/// Random-access view over an extracted RaspberrySet tree.
///
/// The index is built once at construction and immutable afterwards.
/// Images are decoded on every access; nothing is cached.
pub struct RaspberrySet {
    records: Vec<AnnotationRecord>,
    idx_to_class: BTreeMap<i64, String>,
    transform: Option<Transform>,
}

impl std::fmt::Debug for RaspberrySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaspberrySet")
            .field("records", &self.records)
            .field("idx_to_class", &self.idx_to_class)
            .field("transform", &self.transform.as_ref().map(|_| "Transform"))
            .finish()
    }
}

impl RaspberrySet {
    /// Build the index from `root` with no transform.
    pub fn open(root: &Path) -> Result<Self, RaspberrySetError> {
        Self::build(root, None)
    }

    /// Build the index from `root` with a transform applied to every
    /// decoded tensor.
    pub fn with_transform(root: &Path, transform: Transform) -> Result<Self, RaspberrySetError> {
        Self::build(root, Some(transform))
    }

    fn build(root: &Path, transform: Option<Transform>) -> Result<Self, RaspberrySetError> {
        let idx_to_class = read_class_catalog(&root.join(CLASS_CATALOG_FILE))?;

        let mut records = Vec::new();
        for image_path in collect_image_files(root)? {
            let label_path = label_path_for(root, &image_path);
            read_label_file(&label_path, &image_path, &mut records)?;
        }

        Ok(Self {
            records,
            idx_to_class,
            transform,
        })
    }

    /// Number of annotation rows in the index. One image contributes
    /// one row per labeled object.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Class catalog loaded from `classes.txt`, keyed by class index.
    pub fn classes(&self) -> &BTreeMap<i64, String> {
        &self.idx_to_class
    }

    /// The full annotation table in index order, bounding boxes
    /// included.
    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    /// Load the sample at `index`: decode its image from disk, apply
    /// the configured transform if any, and return the tensor together
    /// with the class label and the index itself.
    pub fn get(&self, index: usize) -> Result<Sample, RaspberrySetError> {
        let record =
            self.records
                .get(index)
                .ok_or_else(|| RaspberrySetError::IndexOutOfBounds {
                    index,
                    len: self.records.len(),
                })?;

        let mut inputs = load_image_to_tensor(&record.filepath)?;
        if let Some(transform) = &self.transform {
            inputs = transform(inputs);
        }

        Ok(Sample {
            inputs,
            targets: record.class_idx,
            idx: index,
        })
    }
}

/// Decode the image at `path` into a channel-first `(3, H, W)` RGB
/// tensor normalized from `[0, 255]` to `[0.0, 1.0]`.
pub fn load_image_to_tensor(path: &Path) -> Result<Array3<f32>, RaspberrySetError> {
    let rgb = image::open(path)
        .map_err(|source| RaspberrySetError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let (width, height) = rgb.dimensions();
    let pixels: Vec<f32> = rgb
        .into_raw()
        .into_iter()
        .map(|value| f32::from(value) / 255.0)
        .collect();

    let hwc = Array3::from_shape_vec((height as usize, width as usize, 3), pixels)
        .expect("pixel buffer length matches image dimensions");

    Ok(hwc.permuted_axes([2, 0, 1]).as_standard_layout().to_owned())
}

fn read_class_catalog(path: &Path) -> Result<BTreeMap<i64, String>, RaspberrySetError> {
    let data = fs::read_to_string(path).map_err(|source| RaspberrySetError::ClassCatalogRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut catalog = BTreeMap::new();
    for (line_idx, line) in data.lines().enumerate() {
        let line_num = line_idx + 1;
        let mut tokens = line.split_whitespace();

        let index_token =
            tokens
                .next()
                .ok_or_else(|| RaspberrySetError::ClassCatalogInvalid {
                    path: path.to_path_buf(),
                    message: format!("line {line_num} is empty"),
                })?;

        let class_idx =
            index_token
                .parse::<i64>()
                .map_err(|_| RaspberrySetError::ClassCatalogInvalid {
                    path: path.to_path_buf(),
                    message: format!(
                        "line {line_num}: invalid class index '{index_token}'; expected integer"
                    ),
                })?;

        // Class names may contain spaces; everything after the index
        // belongs to the name.
        let name = tokens.collect::<Vec<_>>().join(" ");
        catalog.insert(class_idx, name);
    }

    Ok(catalog)
}

fn collect_image_files(root: &Path) -> Result<Vec<PathBuf>, RaspberrySetError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| RaspberrySetError::DatasetScan {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    // Directory traversal order is OS-dependent; sort so index
    // positions are stable across runs.
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
}

/// Label files live at the dataset root under the image's stem, even
/// for images discovered in subdirectories.
fn label_path_for(root: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    root.join(format!("{stem}.txt"))
}

fn read_label_file(
    label_path: &Path,
    image_path: &Path,
    records: &mut Vec<AnnotationRecord>,
) -> Result<(), RaspberrySetError> {
    let content =
        fs::read_to_string(label_path).map_err(|source| RaspberrySetError::LabelFileRead {
            path: label_path.to_path_buf(),
            source,
        })?;

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let Some(row) = parse_label_line(line, label_path, line_num)? else {
            continue;
        };

        records.push(AnnotationRecord {
            filepath: image_path.to_path_buf(),
            class_idx: row.class_idx,
            center_x: row.center_x,
            center_y: row.center_y,
            width: row.width,
            height: row.height,
        });
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
struct LabelRow {
    class_idx: i64,
    center_x: f64,
    center_y: f64,
    width: f64,
    height: f64,
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRow>, RaspberrySetError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        return Err(RaspberrySetError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 fields, found {}", tokens.len()),
        });
    }

    let class_idx = tokens[0]
        .parse::<i64>()
        .map_err(|_| RaspberrySetError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid class_idx '{}'; expected integer", tokens[0]),
        })?;

    let center_x = parse_f64_token(tokens[1], "center_x", file_path, line_num)?;
    let center_y = parse_f64_token(tokens[2], "center_y", file_path, line_num)?;
    let width = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let height = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(LabelRow {
        class_idx,
        center_x,
        center_y,
        width,
        height,
    }))
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, RaspberrySetError> {
    raw.parse::<f64>()
        .map_err(|_| RaspberrySetError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
        })
}
