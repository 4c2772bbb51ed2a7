use crate::cli::PanelArgs;
use crate::config::PartialPredictConfig;
use crate::error::Result;
use apscore::core::io::screening::ScreeningTable;
use apscore::core::io::strain_info::StrainInfoTable;
use apscore::core::io::traits::TableFile;
use apscore::core::models::strain::{GramStain, feature_name};
use apscore::engine::encoder::StrainPanel;
use apscore::engine::gram::{self, GramLabels};
use tracing::info;

pub fn run(args: PanelArgs) -> Result<()> {
    let config = PartialPredictConfig::load(&args.artifacts)?.merge_for_panel(&args.artifacts)?;
    let artifacts = &config.artifacts;

    info!("Reading strain panel from {:?}", &artifacts.strain_table_path);
    let names = ScreeningTable.read_from_path(&artifacts.strain_table_path)?;
    let gram_table = StrainInfoTable {
        skip_rows: artifacts.gram_table_skip_rows.clone(),
        index_column: artifacts.gram_index_column.clone(),
        gram_column: artifacts.gram_label_column.clone(),
    }
    .read_from_path(&artifacts.gram_table_path)?;

    let panel = StrainPanel::fit(names)?;
    let labels = gram::resolve(&panel, &gram_table)?;

    for line in render(&panel, &labels) {
        println!("{}", line);
    }
    Ok(())
}

fn render(panel: &StrainPanel, labels: &GramLabels) -> Vec<String> {
    let width = panel.names().iter().map(|n| n.len()).max().unwrap_or(0);
    let mut lines: Vec<String> = panel
        .names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let stain = labels.get(i).map(|s| s.as_str()).unwrap_or("unknown");
            format!("{:<width$}  {:<8}  {}", name, stain, feature_name(name), width = width)
        })
        .collect();
    lines.push(format!(
        "{} strains: {} Gram-positive, {} Gram-negative, {} unknown",
        panel.len(),
        labels.count(GramStain::Positive),
        labels.count(GramStain::Negative),
        labels.unknown()
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use apscore::core::models::strain::NtToken;

    #[test]
    fn render_lists_every_strain_and_a_summary() {
        let panel = StrainPanel::fit(vec![
            "Escherichia coli (NT5001)".to_string(),
            "Mystery (NT0)".to_string(),
        ])
        .unwrap();
        let table = [(NtToken::from_key("NT5001").unwrap(), GramStain::Negative)]
            .into_iter()
            .collect();
        let labels = gram::resolve(&panel, &table).unwrap();

        let lines = render(&panel, &labels);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("negative"));
        assert!(lines[0].ends_with("escherichia_coli_nt5001"));
        assert!(lines[1].contains("unknown"));
        assert_eq!(
            lines[2],
            "2 strains: 0 Gram-positive, 1 Gram-negative, 1 unknown"
        );
    }
}
