//! The staged container: records that have been entered but not yet published. It is persisted as
//! JSON in the data directory so staged work survives between invocations.

use crate::model::Ledger;
use crate::{utils, Config, Result};
use std::path::{Path, PathBuf};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Staged {
    path: PathBuf,
    ledger: Ledger,
}

impl Staged {
    /// Loads the staged container. A missing file means nothing has been staged yet.
    pub async fn load(config: &Config) -> Result<Self> {
        let path = config.staged_path();
        let ledger = if path.is_file() {
            utils::deserialize(&path).await?
        } else {
            trace!("No staged file at {}", path.display());
            Ledger::new()
        };
        Ok(Self { path, ledger })
    }

    /// Writes the staged container back to disk.
    pub async fn save(&self) -> Result<()> {
        utils::serialize(&self.path, &self.ledger).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Expense};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let env = TestEnv::new().await;
        let staged = Staged::load(&env.config()).await.unwrap();
        assert!(staged.ledger().is_empty());
        assert!(!staged.path().exists());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let env = TestEnv::new().await;
        let mut staged = Staged::load(&env.config()).await.unwrap();
        staged.ledger_mut().expenses.push(Expense::new(
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            "Sewa sound system",
            Amount::rupiah(750_000),
            Some("sari".to_string()),
        ));
        staged.save().await.unwrap();

        let reloaded = Staged::load(&env.config()).await.unwrap();
        assert_eq!(reloaded.ledger(), staged.ledger());
    }
}
