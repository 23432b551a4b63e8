//! Writes report files from the published records.

use crate::api::Mode;
use crate::args::ReportArgs;
use crate::commands::{connect, Out};
use crate::error::{ErrorType, IntoResult};
use crate::report::{self, RenderOptions, ReportKind};
use crate::{utils, Config, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// The files written by `fund report`.
#[derive(Debug, Clone, Serialize)]
pub struct Written {
    pub kind: ReportKind,
    pub files: Vec<PathBuf>,
}

/// Renders the report named by `args.kind` in the requested formats and writes the files to
/// `--out`, or to the reports directory of the data directory. Like the summary, reports only read
/// published records and need no login.
pub async fn report(config: &Config, mode: Mode, args: &ReportArgs) -> Result<Out<Written>> {
    let ledger = connect(config, mode)
        .await?
        .fetch_ledger()
        .await
        .pub_result(ErrorType::Remote)?;

    let offset = config.utc_offset();
    let options = RenderOptions {
        generated_at: Utc::now().with_timezone(&offset),
        last_updated: ledger.last_updated.map(|t| t.with_timezone(&offset)),
        letterhead: config.letterhead(),
    };
    let dir = args.out.clone().unwrap_or_else(|| config.reports_dir());
    utils::make_dir(&dir).await.pub_result(ErrorType::Local)?;

    let mut files = Vec::new();
    if args.format.xlsx() {
        let bytes = report::render_xlsx(&ledger, args.kind, &options)?;
        let path = dir.join(args.kind.file_name(&options, "xlsx"));
        utils::write(&path, bytes).await.pub_result(ErrorType::Local)?;
        files.push(path);
    }
    if args.format.pdf() {
        let bytes = report::render_pdf(&ledger, args.kind, &options)?;
        let path = dir.join(args.kind.file_name(&options, "pdf"));
        utils::write(&path, bytes).await.pub_result(ErrorType::Local)?;
        files.push(path);
    }
    debug!(
        "Rendered the {} report from {} published records",
        args.kind,
        ledger.counts().total()
    );

    let message = files
        .iter()
        .map(|p| format!("Wrote {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(
        message,
        Written {
            kind: args.kind,
            files,
        },
    ))
}
