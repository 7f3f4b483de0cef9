//! Service order report rendering
//!
//! Turns an ordered list of enriched service orders into a [`Document`] and
//! writes it as a PDF. A record that fails to render is replaced by an error
//! marker; only failing to write the file aborts a report.

use super::document::{Block, Document, Field};
use super::format::{
    compose_address, format_value, or_fallback, NOT_AVAILABLE, NO_DESCRIPTION, NO_NOTES, PENDING,
    SAME_AS_CUSTOMER,
};
use super::pdf::write_pdf;
use super::photo::{load_photo, PhotoOutcome};
use crate::database::EnrichedServiceOrder;
use crate::error::{AppError, Result};
use crate::storage::{uploads, UploadsStore};
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Relatório de Ordens de Serviço";
pub const NO_RECORDS: &str = "Nenhuma OS encontrada para os filtros.";

/// Renders service order reports into the reports directory
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    uploads: UploadsStore,
    reports_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(uploads: UploadsStore, reports_dir: PathBuf) -> Self {
        Self {
            uploads,
            reports_dir,
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Render `records` in the given order to `<reports_dir>/<filename>`.
    ///
    /// `filename` must be a plain file name. Returns the path written.
    pub fn render_report(&self, records: &[EnrichedServiceOrder], filename: &str) -> Result<PathBuf> {
        let name = uploads::base_name(filename)
            .filter(|name| *name == filename.trim())
            .ok_or_else(|| AppError::Report(format!("Invalid report file name: {:?}", filename)))?;

        std::fs::create_dir_all(&self.reports_dir)?;
        let path = self.reports_dir.join(name);

        self.render_to(records, &path)?;
        Ok(path)
    }

    /// Render `records` to an explicit path
    pub fn render_to(&self, records: &[EnrichedServiceOrder], path: &Path) -> Result<()> {
        tracing::info!("Rendering report with {} service orders to {:?}", records.len(), path);

        let document = self.build_document(records);

        write_pdf(&document, path).map_err(|e| {
            tracing::error!("Failed to write report {:?}: {}", path, e);
            e
        })?;

        tracing::info!("Report written: {:?}", path);
        Ok(())
    }

    /// Lay out the report content without writing anything
    pub fn build_document(&self, records: &[EnrichedServiceOrder]) -> Document {
        let mut document = Document::new(REPORT_TITLE);

        if records.is_empty() {
            document.push(Block::Paragraph(NO_RECORDS.to_string()));
            return document;
        }

        let last = records.len() - 1;

        for (i, record) in records.iter().enumerate() {
            match self.record_blocks(record) {
                Ok(blocks) => document.extend(blocks),
                Err(e) => {
                    tracing::error!(
                        "Failed to render service order {} into report: {}",
                        record.order.id,
                        e
                    );
                    document.push(Block::ErrorMarker(format!(
                        "Erro ao processar dados da OS ID {}. Verifique os logs.",
                        record.order.id
                    )));
                    document.push(Block::Spacer(5.0));
                }
            }

            if i < last {
                document.push(Block::Spacer(3.0));
                document.push(Block::Separator);
                document.push(Block::Spacer(3.0));
            }
        }

        document
    }

    /// Blocks for a single record, built in isolation so a failure leaves
    /// nothing half written in the document
    fn record_blocks(&self, record: &EnrichedServiceOrder) -> Result<Vec<Block>> {
        if let Some(error) = &record.load_error {
            return Err(AppError::Report(format!("Unreadable stored fields: {}", error)));
        }

        let order = &record.order;
        let customer = &record.customer;
        let mut blocks = Vec::new();

        blocks.push(Block::Heading(format!(
            "Ordem de Serviço Nº: {}",
            or_fallback(Some(&order.order_number), NOT_AVAILABLE)
        )));

        blocks.push(Block::Fields(vec![
            Field::new("Cliente:", or_fallback(customer.name.as_deref(), NOT_AVAILABLE)),
            Field::new("Endereço:", compose_address(customer)),
            Field::new("Telefone:", or_fallback(customer.phone.as_deref(), NOT_AVAILABLE)),
            Field::new("Email:", or_fallback(customer.email.as_deref(), NOT_AVAILABLE)),
        ]));
        blocks.push(Block::Spacer(2.0));

        blocks.push(Block::Fields(vec![
            Field::new("Data Entrada:", or_fallback(Some(&order.entry_date), NOT_AVAILABLE)),
            Field::new(
                "Tipo Serviço:",
                or_fallback(record.service_type_name.as_deref(), NOT_AVAILABLE),
            ),
            Field::new(
                "Endereço Serviço:",
                or_fallback(order.service_address.as_deref(), SAME_AS_CUSTOMER),
            ),
            Field::new("Garantia:", or_fallback(order.warranty.as_deref(), NOT_AVAILABLE)),
            Field::new("Status:", or_fallback(order.status.as_deref(), NOT_AVAILABLE)),
            Field::new(
                "Data Conclusão:",
                or_fallback(order.completion_date.as_deref(), PENDING),
            ),
            Field::new("Valor:", format_value(&order.value)),
        ]));
        blocks.push(Block::Spacer(3.0));

        blocks.push(Block::Label("Descrição do Problema/Serviço:".to_string()));
        blocks.push(Block::Paragraph(or_fallback(
            order.problem_description.as_deref(),
            NO_DESCRIPTION,
        )));
        blocks.push(Block::Spacer(2.0));
        blocks.push(Block::Label("Observações:".to_string()));
        blocks.push(Block::Paragraph(or_fallback(order.notes.as_deref(), NO_NOTES)));
        blocks.push(Block::Spacer(3.0));

        if let Some(reference) = order.photo_path.as_deref().filter(|r| !r.trim().is_empty()) {
            match load_photo(&self.uploads, reference)? {
                PhotoOutcome::Embedded(photo) => {
                    blocks.push(Block::Label("Foto Anexada:".to_string()));
                    blocks.push(Block::Spacer(1.0));
                    blocks.push(Block::Image(photo));
                }
                PhotoOutcome::Missing(name) => {
                    tracing::warn!("Photo for service order {} not found: {}", order.id, name);
                    blocks.push(Block::Notice(format!(
                        "Arquivo da imagem não encontrado: {}",
                        name
                    )));
                }
                PhotoOutcome::Unreadable { name, .. } => {
                    blocks.push(Block::Notice(format!(
                        "Erro ao carregar/processar imagem: {}",
                        name
                    )));
                }
            }
            blocks.push(Block::Spacer(3.0));
        }

        Ok(blocks)
    }
}
