// Static supplies page of colour MFPs: one `mainContentArea` table per supply

use super::parse::parse_percent_cell;
use super::{Extract, Level, PageSource, Reading};
use crate::core::devices::MfpSpec;
use crate::error::{Result, SupplyError};
use scraper::{ElementRef, Html, Selector};

pub const STATUS_NOT_FOUND: &str = "Status not found";
const COLLECTION_UNIT_LABEL: &str = "Toner Collection Unit";

struct SupplySelectors {
    table: Selector,
    name: Selector,
    level: Selector,
    row: Selector,
    cell: Selector,
}

impl SupplySelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            table: selector("table.mainContentArea")?,
            name: selector("td.SupplyName.width65")?,
            level: selector("td.SupplyName.width35.alignRight")?,
            row: selector("tr")?,
            cell: selector("td")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SupplyError::config(format!("Invalid selector '{}': {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Supply label: first line of the name cell
fn supply_label(table: ElementRef<'_>, selectors: &SupplySelectors) -> Option<String> {
    let cell = table.select(&selectors.name).next()?;
    let text = element_text(cell);
    text.trim().lines().next().map(|line| line.trim().to_string())
}

/// Every supply row in document order. A repeated label keeps its first
/// position and takes the latest value.
pub fn parse_supply_levels(html: &str) -> Result<Vec<(String, Level)>> {
    let selectors = SupplySelectors::new()?;
    let document = Html::parse_document(html);
    let mut supplies: Vec<(String, Level)> = Vec::new();

    for table in document.select(&selectors.table) {
        let Some(name) = supply_label(table, &selectors) else {
            continue;
        };

        let level = table
            .select(&selectors.level)
            .next()
            .map(|cell| parse_percent_cell(&element_text(cell)))
            .unwrap_or(Level::Unknown);

        match supplies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = level,
            None => supplies.push((name, level)),
        }
    }

    Ok(supplies)
}

/// Value of the first "Status:" label/value row in the given tables
fn status_row<'a>(
    tables: impl Iterator<Item = ElementRef<'a>>,
    selectors: &SupplySelectors,
) -> Option<String> {
    for table in tables {
        for row in table.select(&selectors.row) {
            let cells: Vec<ElementRef<'_>> = row.select(&selectors.cell).collect();
            if cells.len() >= 2 && element_text(cells[0]).trim() == "Status:" {
                return Some(element_text(cells[1]).trim().to_string());
            }
        }
    }
    None
}

/// Toner collection unit status, preferring the table labelled as the
/// collection unit and falling back to the first status row on the page.
pub fn parse_collection_unit_status(html: &str) -> Result<String> {
    let selectors = SupplySelectors::new()?;
    let document = Html::parse_document(html);

    let labelled = document.select(&selectors.table).filter(|table| {
        supply_label(*table, &selectors)
            .map(|label| label.starts_with(COLLECTION_UNIT_LABEL))
            .unwrap_or(false)
    });

    let status = status_row(labelled, &selectors)
        .or_else(|| status_row(document.select(&selectors.table), &selectors))
        .unwrap_or_else(|| STATUS_NOT_FOUND.to_string());

    Ok(status)
}

impl MfpSpec {
    /// Cartridge rows left after removing non-cartridge supplies
    pub fn select_cartridges(&self, mut supplies: Vec<(String, Level)>) -> Vec<(String, Level)> {
        if self.drop_last_supply {
            if let Some((dropped, _)) = supplies.pop() {
                log::debug!("Discarding last supply row '{}'", dropped);
            }
        }

        supplies
            .into_iter()
            .filter(|(name, _)| !self.is_excluded_supply(name))
            .collect()
    }
}

impl Extract for MfpSpec {
    fn extract(&self, source: &dyn PageSource) -> Result<Vec<Reading>> {
        let html = source.fetch_html(&self.url)?;

        let mut readings = vec![Reading::WasteToner(parse_collection_unit_status(&html)?)];
        readings.extend(
            self.select_cartridges(parse_supply_levels(&html)?)
                .into_iter()
                .map(|(name, level)| Reading::Cartridge { name, level }),
        );

        Ok(readings)
    }
}
