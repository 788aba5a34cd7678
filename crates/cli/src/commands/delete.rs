use std::time::Duration;

use indicatif::ProgressBar;

use crate::{
    api::ApiClient,
    commands::{show::CodeCommandError, CodeId},
    config::CliConfig,
};

/// Delete flow entrypoint.
pub(crate) async fn delete(CodeId { id }: CodeId) -> Result<(), CodeCommandError> {
    let config = CliConfig::new()?;

    let pg = ProgressBar::new_spinner();
    pg.enable_steady_tick(Duration::from_millis(150));
    pg.set_message(format!("Deleting code {id}..."));

    ApiClient::new(&config).delete(&id).await?;

    pg.finish_with_message("Code deleted. Printed copies no longer resolve.");

    Ok(())
}
