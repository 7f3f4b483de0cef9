//! Report document model
//!
//! The renderer produces a flat sequence of blocks; the PDF writer lays
//! them out on pages. Keeping the two apart lets the content of a report be
//! inspected without parsing PDF output.

use image::DynamicImage;

/// A label/value row in a field table
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A decoded photo with its final size on the page
#[derive(Debug, Clone)]
pub struct Photo {
    pub image: DynamicImage,
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone)]
pub enum Block {
    Title(String),
    Heading(String),
    Fields(Vec<Field>),
    /// Bold caption preceding free text
    Label(String),
    Paragraph(String),
    /// Italic notice about something that could not be shown
    Notice(String),
    /// Highlighted marker replacing a record that failed to render
    ErrorMarker(String),
    Image(Photo),
    /// Vertical gap in millimetres
    Spacer(f32),
    Separator,
}

impl Block {
    /// Visible text carried by the block
    pub fn text(&self) -> Vec<String> {
        match self {
            Block::Title(text)
            | Block::Heading(text)
            | Block::Label(text)
            | Block::Paragraph(text)
            | Block::Notice(text)
            | Block::ErrorMarker(text) => vec![text.clone()],
            Block::Fields(fields) => fields
                .iter()
                .map(|f| format!("{} {}", f.label, f.value))
                .collect(),
            Block::Image(_) | Block::Spacer(_) | Block::Separator => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            blocks: vec![Block::Title(title.clone())],
            title,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Every line of visible text in order
    pub fn text_lines(&self) -> Vec<String> {
        self.blocks.iter().flat_map(Block::text).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_lines().iter().any(|line| line.contains(needle))
    }

    pub fn image_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Image(_)))
            .count()
    }

    pub fn separator_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Separator))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_starts_with_title() {
        let doc = Document::new("Relatório");
        assert!(matches!(doc.blocks(), [Block::Title(t)] if t == "Relatório"));
    }

    #[test]
    fn test_text_lines() {
        let mut doc = Document::new("T");
        doc.push(Block::Fields(vec![Field::new("Cliente:", "Ana")]));
        doc.push(Block::Spacer(2.0));
        doc.push(Block::Notice("sem foto".into()));

        assert_eq!(doc.text_lines(), vec!["T", "Cliente: Ana", "sem foto"]);
        assert!(doc.contains_text("Ana"));
        assert!(!doc.contains_text("Bruno"));
    }
}
