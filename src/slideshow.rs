//! Slideshow of copied images.
//!
//! The pipeline only knows the [`SlideshowRenderer`] trait: hand it the copied
//! image paths in order plus a target file, get back a summary or an error.
//! No renderer at all is a normal case too: the step is skipped with a notice.
//!
//! The production implementation is [`HtmlSlideshow`], a single static HTML
//! document with one `<section>` per image:
//!
//! - each image is scaled to the slide width, height derived from the
//!   image's own dimensions (read with `image::image_dimensions`, no full
//!   decode), so the aspect ratio is preserved
//! - an image whose dimensions cannot be read gets a text slide
//!   `Unsupported image: <name>` instead
//! - images inside the output directory are referenced relative to it, so
//!   the output directory can be moved as a whole; every path segment is
//!   percent-encoded, so names containing `#`, `?` or spaces still resolve

use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideshowError {
    #[error("IO error writing slideshow {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Slideshow rendering failed: {0}")]
    Render(String),
}

/// What a renderer produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlideshowStats {
    /// Slides showing an image.
    pub images: usize,
    /// Slides replaced by a text notice.
    pub notices: usize,
}

/// Something that can turn an ordered list of images into a document.
pub trait SlideshowRenderer {
    fn render(&self, images: &[PathBuf], target: &Path) -> Result<SlideshowStats, SlideshowError>;
}

/// Renders the slideshow as a self-contained HTML page.
pub struct HtmlSlideshow {
    slide_width: u32,
}

impl HtmlSlideshow {
    pub fn new(slide_width: u32) -> Self {
        Self { slide_width }
    }
}

impl Default for HtmlSlideshow {
    fn default() -> Self {
        Self::new(960)
    }
}

/// One slide, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slide {
    Image {
        src: String,
        alt: String,
        width: u32,
        height: u32,
    },
    Notice {
        name: String,
    },
}

/// Height of an image scaled to `target_width`, aspect ratio preserved.
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2) / u64::from(width);
    scaled.max(1) as u32
}

/// Percent-encode one path segment for use in a URL.
///
/// Unreserved characters pass through; every other byte of the UTF-8
/// encoding becomes `%XX` with uppercase hex.
fn encode_segment(segment: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0x0f)] as char);
        }
    }
    out
}

/// Encoded `/`-joined URL path of the normal components of `path`.
fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(encode_segment(&part.to_string_lossy())),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Reference to `image` usable from a document written into `doc_dir`.
fn image_src(image: &Path, doc_dir: &Path) -> String {
    match image.strip_prefix(doc_dir) {
        Ok(rel) => url_path(rel),
        Err(_) => format!("file:///{}", url_path(image)),
    }
}

impl HtmlSlideshow {
    fn slide_for(&self, image: &Path, doc_dir: &Path) -> Slide {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| image.display().to_string());

        match image::image_dimensions(image) {
            Ok((w, h)) if w > 0 && h > 0 => Slide::Image {
                src: image_src(image, doc_dir),
                alt: name,
                width: self.slide_width,
                height: scaled_height(w, h, self.slide_width),
            },
            Ok(_) => Slide::Notice { name },
            Err(e) => {
                tracing::warn!(image = %image.display(), error = %e, "cannot embed image, adding notice slide");
                Slide::Notice { name }
            }
        }
    }

    fn render_document(&self, slides: &[Slide]) -> Markup {
        let css = format!(
            "body{{margin:0;background:#222;font-family:system-ui,sans-serif}}\
             .slide{{width:{w}px;margin:2rem auto;background:#fff}}\
             .slide img{{display:block}}\
             .notice{{padding:4rem 2rem;text-align:center}}",
            w = self.slide_width
        );
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { "Slideshow" }
                    style { (css) }
                }
                body {
                    @for slide in slides {
                        @match slide {
                            Slide::Image { src, alt, width, height } => {
                                section.slide {
                                    img src=(src) alt=(alt) width=(width) height=(height);
                                }
                            }
                            Slide::Notice { name } => {
                                section.slide.notice {
                                    p { "Unsupported image: " (name) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

impl SlideshowRenderer for HtmlSlideshow {
    fn render(&self, images: &[PathBuf], target: &Path) -> Result<SlideshowStats, SlideshowError> {
        let doc_dir = target.parent().unwrap_or_else(|| Path::new(""));
        let slides: Vec<Slide> = images.iter().map(|img| self.slide_for(img, doc_dir)).collect();

        let stats = SlideshowStats {
            images: slides
                .iter()
                .filter(|s| matches!(s, Slide::Image { .. }))
                .count(),
            notices: slides
                .iter()
                .filter(|s| matches!(s, Slide::Notice { .. }))
                .count(),
        };

        let io_err = |source: std::io::Error| SlideshowError::Io {
            path: target.to_path_buf(),
            source,
        };
        fs::create_dir_all(doc_dir).map_err(io_err)?;
        fs::write(target, self.render_document(&slides).into_string()).map_err(io_err)?;
        Ok(stats)
    }
}
