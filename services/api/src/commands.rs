use crate::infra::directory_service;
use clap::Args;
use jurat::config::AppConfig;
use jurat::error::AppError;
use jurat::forms::{FormFillError, FormTable};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct FillArgs {
    /// Form identifier, e.g. n-400
    #[arg(long)]
    pub(crate) form: String,
    /// JSON file holding the applicant record
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the filled PDF (defaults to `<FORM>.pdf`)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Override the directory holding `<FORM>.pdf` templates
    #[arg(long)]
    pub(crate) template_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CheckArgs {
    /// Only check this form (defaults to every registered form)
    #[arg(long)]
    pub(crate) form: Option<String>,
    /// Override the directory holding `<FORM>.pdf` templates
    #[arg(long)]
    pub(crate) template_dir: Option<PathBuf>,
}

pub(crate) fn run_fill(args: FillArgs) -> Result<(), AppError> {
    let FillArgs {
        form,
        input,
        output,
        template_dir,
    } = args;

    let config = AppConfig::load()?;
    let service = directory_service(&config, template_dir);

    let body = std::fs::read(&input)?;
    let document = service.handle(&form, &body)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&document.filename));
    std::fs::write(&output, &document.bytes)?;

    println!(
        "Wrote {} ({} bytes, {})",
        output.display(),
        document.bytes.len(),
        document.media_type
    );
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs { form, template_dir } = args;

    let config = AppConfig::load()?;
    let service = directory_service(&config, template_dir);

    let tables: Vec<&'static FormTable> = match form {
        Some(form_id) => {
            let table = service
                .catalog()
                .resolve(&form_id)
                .ok_or(FormFillError::TemplateNotFound { form_id })?;
            vec![table]
        }
        None => service.catalog().tables().to_vec(),
    };

    let mut mismatch = None;
    for table in tables {
        let missing = service.engine().missing_targets(table)?;
        let declared = table.targets().count();
        if missing.is_empty() {
            println!(
                "{} (revision {}): all {} mapped fields present",
                table.form_id, table.revision, declared
            );
            continue;
        }

        println!(
            "{} (revision {}): {} of {} mapped fields missing",
            table.form_id,
            table.revision,
            missing.len(),
            declared
        );
        for target in &missing {
            println!("- {}", target);
        }
        if mismatch.is_none() {
            mismatch = Some(AppError::TemplateMismatch {
                form_id: table.form_id.to_string(),
                missing: missing.len(),
            });
        }
    }

    match mismatch {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
