use clap::{Args, Subcommand};
use std::path::PathBuf;
use vhn_readmission::analytics::audit::{audit_data_quality, render_audit_summary};
use vhn_readmission::analytics::dataset::{load_csv_path, write_csv_path};
use vhn_readmission::analytics::readmission::{
    correlation_matrix, readmission_breakdown, readmission_rates, CorrelationMatrix,
    ReadmissionBreakdown, ReadmissionRates,
};
use vhn_readmission::analytics::vci::{RiskShare, VciEngine};
use vhn_readmission::config::LookupConfig;
use vhn_readmission::error::AppError;
use vhn_readmission::tooling::lookup::{CodeDescription, DescriptionLookup, HttpDescriptionSource};
use vhn_readmission::tooling::notebook::{merge_files, patch_file, NotebookPatch};
use vhn_readmission::tooling::reference::{reformat_file, MappingSummary};

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// CSV extract to audit
    pub(crate) csv: PathBuf,
    /// Emit the audit result as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV extract holding one encounter per row
    pub(crate) csv: PathBuf,
    /// Write the extract with vci_score and vci_risk_category appended
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ReferenceCommand {
    /// Flatten a stacked identifier mapping export into Table,ID,Description rows
    Reformat { input: PathBuf, output: PathBuf },
}

#[derive(Subcommand, Debug)]
pub(crate) enum NotebookCommand {
    /// Replace a literal in every source line that contains it
    Patch {
        file: PathBuf,
        #[arg(long)]
        find: String,
        #[arg(long)]
        replace: String,
    },
    /// Add the missing unstack step to the risk-order readmission table
    FixIndexing { file: PathBuf },
    /// Point the mapping load at the reformatted reference file
    FixMappingPath { file: PathBuf },
    /// Concatenate notebook sections, keeping the first one's metadata
    Merge {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Diagnosis codes to describe
    #[arg(required = true)]
    pub(crate) codes: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ReadmissionArgs {
    /// CSV extract with a readmitted column
    pub(crate) csv: PathBuf,
    /// Column to group encounters by
    #[arg(long)]
    pub(crate) column: String,
    /// Print outcome counts per category instead of early readmission rates
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CorrelationArgs {
    /// CSV extract to correlate
    pub(crate) csv: PathBuf,
    /// Numeric columns to include (defaults to every numeric column)
    #[arg(long, value_delimiter = ',')]
    pub(crate) columns: Vec<String>,
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let table = load_csv_path(&args.csv)?;
    let audit = audit_data_quality(&table);

    if args.json {
        let rendered = serde_json::to_string_pretty(&audit).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_audit_summary(&audit));
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let engine = VciEngine::new();
    let table = load_csv_path(&args.csv)?;
    let outcomes = engine.score_table(&table);
    let distribution = engine.risk_distribution(&outcomes);

    print!("{}", render_distribution(outcomes.len(), &distribution));

    if let Some(output) = args.output {
        let annotated = engine.annotate_table(table)?;
        write_csv_path(&output, &annotated)?;
        tracing::info!(output = %output.display(), "wrote scored extract");
    }
    Ok(())
}

pub(crate) fn run_reference(command: ReferenceCommand) -> Result<(), AppError> {
    match command {
        ReferenceCommand::Reformat { input, output } => {
            let summary = reformat_file(&input, &output)?;
            print!("{}", render_mapping_summary(&summary));
            println!("Saved to: {}", output.display());
            Ok(())
        }
    }
}

pub(crate) fn run_notebook(command: NotebookCommand) -> Result<(), AppError> {
    let (file, patch) = match command {
        NotebookCommand::Merge { output, inputs } => {
            let cells = merge_files(&inputs, &output)?;
            println!(
                "Merged {} notebooks ({} cells) into {}",
                inputs.len(),
                cells,
                output.display()
            );
            return Ok(());
        }
        NotebookCommand::Patch {
            file,
            find,
            replace,
        } => (file, NotebookPatch::replace(find, replace)),
        NotebookCommand::FixIndexing { file } => (file, NotebookPatch::risk_table_unstack()),
        NotebookCommand::FixMappingPath { file } => {
            (file, NotebookPatch::formatted_mapping_path())
        }
    };

    let rewritten = patch_file(&file, &patch)?;
    if rewritten == 0 {
        println!("No matching lines in {}", file.display());
    } else {
        println!("Rewrote {} line(s) in {}", rewritten, file.display());
    }
    Ok(())
}

pub(crate) async fn run_lookup(args: LookupArgs, config: &LookupConfig) -> Result<(), AppError> {
    let source = HttpDescriptionSource::new(config)?;
    let lookup = DescriptionLookup::new(source, config.delay);
    let described = lookup.describe_many(&args.codes).await;

    print!("{}", render_descriptions(&described));
    Ok(())
}

pub(crate) fn run_readmission(args: ReadmissionArgs) -> Result<(), AppError> {
    let table = load_csv_path(&args.csv)?;
    if args.breakdown {
        let breakdown = readmission_breakdown(&table, &args.column)?;
        print!("{}", render_breakdown(&breakdown));
    } else {
        let rates = readmission_rates(&table, &args.column)?;
        print!("{}", render_rates(&rates));
    }
    Ok(())
}

pub(crate) fn run_correlation(args: CorrelationArgs) -> Result<(), AppError> {
    let table = load_csv_path(&args.csv)?;
    let selected: Vec<&str> = args.columns.iter().map(String::as_str).collect();
    let columns = (!selected.is_empty()).then_some(selected.as_slice());
    let matrix = correlation_matrix(&table, columns)?;

    print!("{}", render_correlation(&matrix));
    Ok(())
}

fn render_distribution(total: usize, distribution: &[RiskShare]) -> String {
    std::iter::once(format!("Scored {total} encounter(s)\n"))
        .chain(distribution.iter().map(|share| {
            format!(
                "  {:<7} {:>8} ({:.1}%)\n",
                share.label, share.count, share.percentage
            )
        }))
        .collect()
}

fn render_mapping_summary(summary: &MappingSummary) -> String {
    std::iter::once(format!("Reformatted {} mapping entries\n", summary.total))
        .chain(
            summary
                .tables
                .iter()
                .map(|table| format!("  {}: {} entries\n", table.table, table.count)),
        )
        .collect()
}

fn render_descriptions(described: &[CodeDescription]) -> String {
    described
        .iter()
        .map(|entry| format!("{}: {}\n", entry.code, entry.description))
        .collect()
}

fn render_rates(rates: &ReadmissionRates) -> String {
    std::iter::once(format!("{}\n", rates.labels.title))
        .chain(rates.rates.iter().map(|rate| {
            format!(
                "  {:<30} {:>6.2}% ({} of {})\n",
                rate.category, rate.rate, rate.early_readmissions, rate.total
            )
        }))
        .chain(std::iter::once(format!(
            "  Average: {:.2}%\n",
            rates.average_rate
        )))
        .collect()
}

fn render_breakdown(breakdown: &ReadmissionBreakdown) -> String {
    let header: String = breakdown
        .outcomes
        .iter()
        .map(|outcome| format!(" {outcome:>8}"))
        .collect();

    std::iter::once(format!("{}\n", breakdown.labels.title))
        .chain(std::iter::once(format!(
            "  {:<30}{header} {:>8}\n",
            breakdown.labels.x_label, "Total"
        )))
        .chain(breakdown.categories.iter().map(|category| {
            let counts: String = category
                .outcomes
                .iter()
                .map(|outcome| format!(" {:>8}", outcome.count))
                .collect();
            format!(
                "  {:<30}{counts} {:>8}\n",
                category.category, category.total
            )
        }))
        .collect()
}

fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let header: String = matrix
        .columns
        .iter()
        .map(|column| format!(" {column:>20}"))
        .collect();

    std::iter::once(format!("  {:<20}{header}\n", ""))
        .chain(matrix.columns.iter().zip(&matrix.values).map(|(column, row)| {
            let cells: String = row
                .iter()
                .map(|value| match value {
                    Some(value) => format!(" {value:>20.3}"),
                    None => format!(" {:>20}", "-"),
                })
                .collect();
            format!("  {column:<20}{cells}\n")
        }))
        .collect()
}
