// Reader for the '#'-delimited virtual sales file
use crate::model::ParserError;
use crate::nlp::tokenizer::parse_number;
use crate::sale::SaleMeta;
use std::path::Path;
use tracing::{info, warn};

const DELIMITER: char = '#';
const COLUMNS: usize = 5;

pub trait Parser {
    fn parse(&self, content: &str) -> Vec<SaleMeta>;
}

/// Column order: sale_id, title, description, price, price_original.
pub struct VirtualSalesParser;

impl VirtualSalesParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<SaleMeta, ParserError> {
        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if fields.len() != COLUMNS {
            return Err(ParserError::InvalidLine {
                line: line_no,
                reason: format!("expected {} fields, found {}", COLUMNS, fields.len()),
            });
        }
        let title = fields[1];
        if title.is_empty() {
            return Err(ParserError::InvalidLine {
                line: line_no,
                reason: "empty title".into(),
            });
        }
        let number = |text: &str| -> Result<Option<f64>, ParserError> {
            if text.is_empty() {
                return Ok(None);
            }
            match parse_number(text) {
                Some(v) if v >= 0.0 => Ok(Some(v)),
                _ => Err(ParserError::InvalidLine {
                    line: line_no,
                    reason: ParserError::BadNumber(text.to_string()).to_string(),
                }),
            }
        };
        Ok(SaleMeta {
            sale_id: (!fields[0].is_empty()).then(|| fields[0].to_string()),
            title: title.to_string(),
            description: fields[2].to_string(),
            price: number(fields[3])?,
            price_original: number(fields[4])?,
            ..Default::default()
        })
    }

    pub fn read_file(&self, path: &Path) -> std::io::Result<Vec<SaleMeta>> {
        let content = std::fs::read_to_string(path)?;
        let sales = self.parse(&content);
        info!("Read {} virtual sales from {}", sales.len(), path.display());
        Ok(sales)
    }
}

impl Parser for VirtualSalesParser {
    /// Invalid lines are logged and skipped.
    fn parse(&self, content: &str) -> Vec<SaleMeta> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(i, line)| match self.parse_line(i + 1, line) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!("Skipping virtual sale: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_lines_and_skips_bad_ones() {
        let content = "\
v1#Hape Kugelbahn#The Roundabout, wie neu#30#120
v2#USM Kitos Tisch#Durchmesser 90 cm#390.-#
only#three#fields

#Stokke Tripp Trapp#Buche##
v4#Lampe#defekt#billig#
";
        let sales = VirtualSalesParser::new().parse(content);
        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0].sale_id.as_deref(), Some("v1"));
        assert_eq!(sales[0].price, Some(30.0));
        assert_eq!(sales[0].price_original, Some(120.0));
        assert_eq!(sales[1].price, Some(390.0));
        assert_eq!(sales[1].price_original, None);
        assert_eq!(sales[2].sale_id, None);
        assert_eq!(sales[2].title, "Stokke Tripp Trapp");
    }

    #[test]
    fn reports_line_numbers() {
        let err = VirtualSalesParser::new().parse_line(7, "a#b").unwrap_err();
        assert!(matches!(err, ParserError::InvalidLine { line: 7, .. }));
        let err = VirtualSalesParser::new().parse_line(3, "a##d#1#2").unwrap_err();
        assert!(matches!(err, ParserError::InvalidLine { line: 3, .. }));
    }
}
