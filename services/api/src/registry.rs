use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use utn_recruitment::config::{AppConfig, UnicoreConfig};
use utn_recruitment::error::AppError;
use utn_recruitment::telemetry::redact_identity;
use utn_recruitment::unicore::{
    verify_many, IdentityRecord, Lookup, MembershipGateway, MembershipVerdict, SsnSource,
    UnicoreClient,
};

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// National identity number, or member number for exchange students
    pub(crate) identity_number: String,
    /// Print the identity number in full instead of masking it
    #[arg(long)]
    pub(crate) reveal: bool,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Identity numbers to check
    pub(crate) identity_numbers: Vec<String>,
    /// File with one identity number per line; `#` starts a comment
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
}

fn connect() -> Result<(UnicoreClient, UnicoreConfig), AppError> {
    let config = AppConfig::load()?.unicore;
    let client = UnicoreClient::new(&config)?;
    Ok((client, config))
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let (client, _) = connect()?;
    match client.lookup_identity(&args.identity_number).await? {
        Lookup::Found(record) => render_identity(&record, args.reveal),
        Lookup::NotFound => println!(
            "No person with identity number {} in unicore",
            redact_identity(&args.identity_number)
        ),
    }
    Ok(())
}

pub(crate) async fn run_is_member(args: LookupArgs) -> Result<(), AppError> {
    let (client, _) = connect()?;
    let shown = display_identity(&args.identity_number, args.reveal);
    match client.check_membership(&args.identity_number).await? {
        Lookup::Found(true) => println!("{shown}: member"),
        Lookup::Found(false) => println!("{shown}: not a member"),
        Lookup::NotFound => println!("{shown}: unknown to unicore"),
    }
    Ok(())
}

pub(crate) async fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let mut identity_numbers = args.identity_numbers;
    if let Some(path) = args.file {
        let contents = std::fs::read_to_string(path)?;
        identity_numbers.extend(parse_identity_list(&contents));
    }
    if identity_numbers.is_empty() {
        println!("No identity numbers given");
        return Ok(());
    }

    let (client, config) = connect()?;
    let verdicts = verify_many(
        Arc::new(client),
        identity_numbers,
        config.bulk_parallelism,
    )
    .await;

    println!(
        "Membership verification ({} identities, {} in flight)",
        verdicts.len(),
        config.bulk_parallelism
    );
    for verdict in &verdicts {
        println!(
            "- {}: {}",
            redact_identity(&verdict.identity_number),
            verdict_label(verdict)
        );
    }

    let members = verdicts.iter().filter(|v| v.is_member()).count();
    let failed = verdicts.iter().filter(|v| v.outcome.is_err()).count();
    println!(
        "{members} member(s), {} non-member(s), {failed} failed",
        verdicts.len() - members - failed
    );
    Ok(())
}

fn render_identity(record: &IdentityRecord, reveal: bool) {
    let source = match record.ssn_source {
        SsnSource::NationalId => "national identity number",
        SsnSource::MemberNumber => "member number (exchange student)",
    };
    println!("{}", record.full_name());
    println!("- identity: {} ({source})", display_identity(&record.ssn, reveal));
    println!("- email: {}", or_dash(&record.email));
    println!("- phone: {}", or_dash(&record.phone_number));
    println!("- unicore id: {}", record.external_id);
}

fn display_identity(identity_number: &str, reveal: bool) -> String {
    if reveal {
        identity_number.to_string()
    } else {
        redact_identity(identity_number)
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub(crate) fn parse_identity_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn verdict_label(verdict: &MembershipVerdict) -> String {
    match &verdict.outcome {
        Ok(Lookup::Found(true)) => "member".to_string(),
        Ok(Lookup::Found(false)) => "not a member".to_string(),
        Ok(Lookup::NotFound) => "unknown to unicore".to_string(),
        Err(err) if err.is_retryable() => format!("failed, retry later ({err})"),
        Err(err) => format!("failed ({err})"),
    }
}
