use crate::{
    api::ApiClient,
    commands::{show::CodeCommandError, CodeId},
    config::CliConfig,
};

/// Payload flow entrypoint.
///
/// The payload is resolved by the API server, so it never changes
/// regardless of the edits made to the code.
pub(crate) async fn payload(CodeId { id }: CodeId) -> Result<(), CodeCommandError> {
    let config = CliConfig::new()?;

    println!("{}", ApiClient::new(&config).payload(&id).await?);

    Ok(())
}
