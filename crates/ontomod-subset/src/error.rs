use ontomod_dsl::ClassExprParseError;
use ontomod_model::PrefixError;
use ontomod_reasoner::OracleError;
use std::path::PathBuf;

/// Problems with the extraction request itself. All of them are detected
/// before the first oracle query.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("cannot parse query `{query}`: {source}")]
    Query {
        query: String,
        #[source]
        source: ClassExprParseError,
    },
    #[error("query `{query}` names an unknown entity {entity}")]
    UnresolvedEntity { query: String, entity: String },
    #[error("invalid term identifier: {0}")]
    InvalidIdentifier(#[from] PrefixError),
    #[error("cannot read term file `{}`: {source}", path.display())]
    TermFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot load configuration `{}`: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("reasoner unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),
}

impl From<PrefixError> for ExtractError {
    fn from(err: PrefixError) -> Self {
        ExtractError::Configuration(err.into())
    }
}
