//! # PDF Serializer
//!
//! Takes laid-out pages and writes a valid PDF 1.7 file from scratch. The
//! raw bytes are written directly — no PDF library — which keeps the
//! exporter self-contained; the subset of the spec a report needs (text in
//! the standard fonts, embedded images, Flate-compressed streams) is small.
//!
//! ## Structure
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, fonts, pages, streams, images)
//! 2 0 obj ... endobj
//! ...
//! xref                <- byte offset of every object
//! trailer             <- points at the catalog
//! %%EOF
//! ```

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // write! on String
use std::io::Write as IoWrite; // write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawOp, LayoutPage};
use crate::model::Metadata;

pub struct PdfWriter;

/// Objects allocated so far. PDF object numbers are 1-based; index 0 is
/// the conventional free-list head.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Registered fonts: (face, object id), referenced as /F0, /F1, ...
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject ids for images, referenced as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page index, op index) to an entry in `image_objects`.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Reserved ids: 0 = free-list placeholder, 1 = Catalog, 2 = Pages.
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let font_resources = self.build_font_resource_dict(&builder.font_objects);
            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources, xobject_resources
                )
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info_dict(&mut builder, metadata);

        self.serialize(&builder, info_obj_id)
    }

    /// The Info dictionary, when the report carries any metadata.
    fn write_info_dict(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        if metadata.title.is_none() && metadata.author.is_none() {
            return None;
        }
        let id = builder.objects.len();
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", encode_pdf_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", encode_pdf_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", encode_pdf_text(subject));
        }
        let creator = metadata.creator.as_deref().unwrap_or("evidoc");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (evidoc {}) >>",
            encode_pdf_text(creator),
            env!("CARGO_PKG_VERSION")
        );
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });
        Some(id)
    }

    /// Build the content stream for a single page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
    ) -> String {
        let mut stream = String::new();

        for (op_idx, op) in page.ops.iter().enumerate() {
            match op {
                DrawOp::Text { font, size, lines } => {
                    let font_idx = self.font_index(*font, &builder.font_objects);
                    let _ = write!(stream, "BT\n/F{} {:.1} Tf\n0 g\n", font_idx, size);
                    for line in lines {
                        // PDF y grows upward; layout y grows downward.
                        let pdf_y = page.height - line.y;
                        let _ = write!(
                            stream,
                            "1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                            line.x,
                            pdf_y,
                            encode_pdf_text(&line.text)
                        );
                    }
                    let _ = write!(stream, "ET\n");
                }

                DrawOp::Image {
                    x, y, width, height, ..
                } => {
                    let pdf_y = page.height - y - height;
                    if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, op_idx)) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            width, height, x, pdf_y, img_idx
                        );
                    } else {
                        // Grey placeholder if the image was never registered.
                        let _ = write!(
                            stream,
                            "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                            x, pdf_y, width, height
                        );
                    }
                }
            }
        }

        stream
    }

    /// One Type1 font object per face actually drawn with.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used: Vec<StandardFont> = Vec::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { font, .. } = op {
                    if !used.contains(font) {
                        used.push(*font);
                    }
                }
            }
        }
        used.sort();

        // A page tree with no text still resolves /F0.
        if used.is_empty() {
            used.push(StandardFont::Helvetica);
        }

        for font in used {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Look up the /F index for a face, falling back to the first font.
    fn font_index(&self, font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(registered, _)| *registered == font)
            .unwrap_or(0)
    }

    /// Walk all pages and create XObjects for every placed image.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            for (op_idx, op) in page.ops.iter().enumerate() {
                if let DrawOp::Image { image, .. } = op {
                    let img_idx = builder.image_objects.len();
                    let obj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push(obj_id);
                    builder.image_index_map.insert((page_idx, op_idx), img_idx);
                }
            }
        }
    }

    /// Write an image as one or two XObjects (SMask first when there is an
    /// alpha channel). Returns the main XObject id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_name = match color_space {
                    JpegColorSpace::DeviceRgb => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_name,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    smask_data.extend_from_slice(&compressed);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    /// The /XObject resource entries for one page, in /Im order.
    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        if entries.is_empty() {
            return String::new();
        }
        entries.sort_by_key(|(idx, _)| *idx);
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Serialize all objects into the final byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        // Binary-content marker bytes, per convention.
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R",
            builder.objects.len()
        );
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

/// Escape a string for a PDF literal string: backslash-escape the
/// delimiters, octal-escape everything outside printable ASCII. Characters
/// beyond Latin-1 have no WinAnsi slot and degrade to '?'.
fn encode_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            _ => {
                let byte = if (ch as u32) < 256 { ch as u32 as u8 } else { b'?' };
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacedLine;

    fn text_page(font: StandardFont, text: &str) -> LayoutPage {
        LayoutPage {
            width: 595.28,
            height: 841.89,
            ops: vec![DrawOp::Text {
                font,
                size: 11.0,
                lines: vec![PlacedLine {
                    text: text.to_string(),
                    x: 40.0,
                    y: 54.0,
                }],
            }],
        }
    }

    fn image_page(pixel_data: ImagePixelData) -> LayoutPage {
        LayoutPage {
            width: 595.28,
            height: 841.89,
            ops: vec![DrawOp::Image {
                image: LoadedImage {
                    pixel_data,
                    width_px: 1,
                    height_px: 1,
                },
                x: 40.0,
                y: 100.0,
                width: 1.0,
                height: 1.0,
            }],
        }
    }

    #[test]
    fn test_encode_pdf_text() {
        assert_eq!(encode_pdf_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(encode_pdf_text("back\\slash"), "back\\\\slash");
        assert_eq!(encode_pdf_text("café"), "caf\\351");
        assert_eq!(encode_pdf_text("漢"), "\\077");
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let writer = PdfWriter::new();
        let pages = vec![LayoutPage {
            width: 595.28,
            height: 841.89,
            ops: vec![],
        }];
        let bytes = writer.write(&pages, &Metadata::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn test_metadata_in_info_dict() {
        let writer = PdfWriter::new();
        let metadata = Metadata {
            title: Some("Evidence Report".to_string()),
            author: Some("QA".to_string()),
            subject: None,
            creator: None,
        };
        let bytes = writer.write(&[text_page(StandardFont::Helvetica, "x")], &metadata);
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Evidence Report)"));
        assert!(text.contains("/Author (QA)"));
        assert!(text.contains("/Info"));
    }

    #[test]
    fn test_no_metadata_no_info_dict() {
        let writer = PdfWriter::new();
        let bytes = writer.write(
            &[text_page(StandardFont::Helvetica, "x")],
            &Metadata::default(),
        );
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("/Info"));
    }

    #[test]
    fn test_both_faces_registered() {
        let writer = PdfWriter::new();
        let pages = vec![
            text_page(StandardFont::Helvetica, "value"),
            text_page(StandardFont::HelveticaBold, "Label"),
        ];
        let bytes = writer.write(&pages, &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_image_becomes_xobject() {
        let writer = PdfWriter::new();
        let page = image_page(ImagePixelData::Decoded {
            rgb: vec![255, 0, 0],
            alpha: None,
        });
        let bytes = writer.write(&[page], &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/Im0"));
    }

    #[test]
    fn test_smask_written_for_alpha() {
        let writer = PdfWriter::new();
        let page = image_page(ImagePixelData::Decoded {
            rgb: vec![0, 255, 0],
            alpha: Some(vec![128]),
        });
        let bytes = writer.write(&[page], &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/SMask"));
    }
}
