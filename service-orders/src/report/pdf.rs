//! PDF output for report documents
//!
//! Lays blocks out top to bottom on A4 pages using the built-in Helvetica
//! faces, starting a new page whenever the next piece does not fit.

use super::document::{Block, Document, Field, Photo};
use super::photo::MM_PER_POINT;
use crate::config::{
    BODY_FONT_SIZE, BODY_LEADING, HEADING_FONT_SIZE, LABEL_COLUMN_MM, PAGE_HEIGHT_MM,
    PAGE_MARGIN_MM, PAGE_WIDTH_MM, TITLE_FONT_SIZE,
};
use crate::error::Result;
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Resolution at which one image pixel maps to one point
const IMAGE_DPI: f32 = 72.0;
/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;
const SEPARATOR_DASHES: usize = 66;
const LAYER_NAME: &str = "Conteúdo";

/// Write `document` as a PDF file at `path`
pub fn write_pdf(document: &Document, path: &Path) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(
        document.title(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );

    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique)?,
    };

    let pages = {
        let mut writer = PageWriter {
            layer: doc.get_page(page).get_layer(layer),
            doc: &doc,
            fonts,
            y: top_of_page(),
            pages: 1,
        };

        for block in document.blocks() {
            writer.write_block(block);
        }

        writer.pages
    };

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))?;

    tracing::debug!("Wrote {} page(s) to {:?}", pages, path);
    Ok(())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    /// Current baseline position, millimetres from the bottom edge
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn write_block(&mut self, block: &Block) {
        match block {
            Block::Title(text) => {
                let leading = points(TITLE_FONT_SIZE * 1.2);
                for line in wrap(text, chars_per_line(content_width(), TITLE_FONT_SIZE)) {
                    let indent =
                        ((content_width() - width_of(&line, TITLE_FONT_SIZE)) / 2.0).max(0.0);
                    self.line(&line, TITLE_FONT_SIZE, Face::Bold, indent, leading);
                }
                self.gap(10.0);
            }
            Block::Heading(text) => {
                self.ensure(points(HEADING_FONT_SIZE * 1.2) * 3.0);
                self.text(text, HEADING_FONT_SIZE, Face::Bold, 0.0, content_width());
                self.gap(2.0);
            }
            Block::Fields(fields) => {
                for field in fields {
                    self.field(field);
                }
            }
            Block::Label(text) => {
                self.ensure(points(BODY_LEADING) * 2.0);
                self.text(text, BODY_FONT_SIZE, Face::Bold, 0.0, content_width());
            }
            Block::Paragraph(text) => {
                self.text(text, BODY_FONT_SIZE, Face::Regular, 0.0, content_width());
            }
            Block::Notice(text) => {
                self.text(text, BODY_FONT_SIZE, Face::Italic, 0.0, content_width());
            }
            Block::ErrorMarker(text) => {
                self.layer
                    .set_fill_color(Color::Rgb(Rgb::new(0.8, 0.0, 0.0, None)));
                self.text(text, BODY_FONT_SIZE, Face::Bold, 0.0, content_width());
                self.layer
                    .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
            }
            Block::Image(photo) => self.image(photo),
            Block::Spacer(mm) => self.gap(*mm),
            Block::Separator => {
                self.text(
                    &"-".repeat(SEPARATOR_DASHES),
                    BODY_FONT_SIZE,
                    Face::Regular,
                    0.0,
                    content_width(),
                );
            }
        }
    }

    fn field(&mut self, field: &Field) {
        let value_width = content_width() - LABEL_COLUMN_MM;
        let lines = wrap(&field.value, chars_per_line(value_width, BODY_FONT_SIZE));
        let leading = points(BODY_LEADING);

        self.ensure(leading);
        self.place(&field.label, BODY_FONT_SIZE, Face::Bold, 0.0);

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.advance(leading);
            }
            self.place(line, BODY_FONT_SIZE, Face::Regular, LABEL_COLUMN_MM);
        }

        self.y -= leading;
    }

    fn image(&mut self, photo: &Photo) {
        self.ensure(photo.height_mm);

        let rgb = DynamicImage::ImageRgb8(photo.image.to_rgb8());
        let natural_width = rgb.width() as f32 * MM_PER_POINT;
        let natural_height = rgb.height() as f32 * MM_PER_POINT;
        let x = PAGE_MARGIN_MM + (content_width() - photo.width_mm) / 2.0;
        let y = self.y - photo.height_mm;

        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                scale_x: Some(photo.width_mm / natural_width),
                scale_y: Some(photo.height_mm / natural_height),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );

        self.y = y;
    }

    /// Wrapped text starting at `indent`
    fn text(&mut self, text: &str, size: f32, face: Face, indent: f32, width: f32) {
        let leading = if size > BODY_FONT_SIZE {
            points(size * 1.2)
        } else {
            points(BODY_LEADING)
        };

        for line in wrap(text, chars_per_line(width, size)) {
            self.line(&line, size, face, indent, leading);
        }
    }

    /// One line of text, advancing by `leading` millimetres
    fn line(&mut self, line: &str, size: f32, face: Face, indent: f32, leading: f32) {
        self.ensure(leading);
        self.place(line, size, face, indent);
        self.y -= leading;
    }

    /// Draw text on the current baseline without moving
    fn place(&self, text: &str, size: f32, face: Face, indent: f32) {
        let font = match face {
            Face::Regular => &self.fonts.regular,
            Face::Bold => &self.fonts.bold,
            Face::Italic => &self.fonts.italic,
        };
        // Baseline sits one font size below the current top position
        let baseline = self.y - points(size);
        self.layer
            .use_text(text, size, Mm(PAGE_MARGIN_MM + indent), Mm(baseline), font);
    }

    fn advance(&mut self, mm: f32) {
        self.ensure(mm * 2.0);
        self.y -= mm;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
        if self.y < PAGE_MARGIN_MM {
            self.new_page();
        }
    }

    /// Start a new page unless `needed` millimetres still fit on this one
    fn ensure(&mut self, needed: f32) {
        let fresh_page = (self.y - top_of_page()).abs() < f32::EPSILON;
        if self.y - needed < PAGE_MARGIN_MM && !fresh_page {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = top_of_page();
        self.pages += 1;
    }
}

fn top_of_page() -> f32 {
    PAGE_HEIGHT_MM - PAGE_MARGIN_MM
}

fn content_width() -> f32 {
    PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM
}

fn points(pt: f32) -> f32 {
    pt * MM_PER_POINT
}

fn glyph_width(size: f32) -> f32 {
    points(size * AVG_GLYPH_WIDTH)
}

fn width_of(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * glyph_width(size)
}

fn chars_per_line(width_mm: f32, size: f32) -> usize {
    ((width_mm / glyph_width(size)).floor() as usize).max(1)
}

/// Greedy word wrap on whitespace; words longer than a line are split.
/// Explicit newlines are kept and an empty text yields one empty line.
pub(crate) fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };

            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_wrap_short_text() {
        assert_eq!(wrap("Troca de tela", 40), vec!["Troca de tela"]);
        assert_eq!(wrap("", 40), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("aparelho não liga após queda", 12),
            vec!["aparelho não", "liga após", "queda"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words_and_keeps_newlines() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap("linha 1\nlinha 2", 40), vec!["linha 1", "linha 2"]);
    }

    #[test]
    fn test_write_pdf_paginates_long_documents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("long.pdf");

        let mut doc = Document::new("Relatório de Ordens de Serviço");
        for i in 0..200 {
            doc.push(Block::Heading(format!("Ordem de Serviço Nº: {}", i)));
            doc.push(Block::Fields(vec![Field::new("Cliente:", "Ana")]));
            doc.push(Block::Separator);
        }

        write_pdf(&doc, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_pdf_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("x.pdf");

        assert!(write_pdf(&Document::new("x"), &path).is_err());
    }
}
