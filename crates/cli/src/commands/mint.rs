use std::sync::Arc;

use common::origin::{Base, InvalidOrigin, OriginResolver, SystemInterfaces};
use derive_more::{Display, Error, From};

use crate::config::{CliConfig, CliConfigError};

/// `mint` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum MintError {
    /// CLI configuration error.
    Config(CliConfigError),

    /// Configured web origin cannot be used to build payloads.
    #[display(fmt = "invalid web origin: {}", _0)]
    InvalidOrigin(InvalidOrigin),
}

/// Resolve the base of locally built payloads.
///
/// Loopback web origins are replaced with the LAN address of this machine,
/// so that payloads remain reachable from other devices.
pub(super) fn local_base(config: &CliConfig) -> Result<Base, InvalidOrigin> {
    let origin = Base::parse(config.web_origin())?;
    let resolver = OriginResolver::new(Arc::new(SystemInterfaces), origin.clone());

    Ok(resolver.resolve_origin(&origin))
}

/// Mint flow entrypoint.
///
/// Identifiers are minted locally, nothing is persisted until the `create` subcommand is used.
pub(crate) fn mint() -> Result<(), MintError> {
    let config = CliConfig::new()?;
    let base = local_base(&config)?;

    let id = common::id::mint();

    println!("Code identifier: {id}");
    println!("Payload: {}", base.payload(id));

    Ok(())
}
