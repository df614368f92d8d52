//! File helpers shared by the pipeline and the `formtool` binary

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{FormError, FormResult};

/// Where the diagnostic overlay is written unless told otherwise
pub const DEFAULT_OVERLAY_PATH: &str = "example.png";

const SCAN_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "tif"];

/// Load a scan as 8-bit RGB
pub fn load_rgb<P: AsRef<Path>>(path: P) -> FormResult<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| FormError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Write an image; the format follows the file extension
pub fn save_rgb<P: AsRef<Path>>(image: &RgbImage, path: P) -> FormResult<()> {
    let path = path.as_ref();
    image.save(path).map_err(|source| FormError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Expand a list of files and directories into scan paths.
///
/// Files are kept as given. Directories are walked recursively and their
/// images are added in sorted order.
pub fn scan_paths<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let mut found = collect_images(input);
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.to_path_buf());
        }
    }
    paths
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if SCAN_EXTENSIONS.contains(&ext.as_str()) {
                    images.push(path);
                }
            }
        }
    }

    images
}
