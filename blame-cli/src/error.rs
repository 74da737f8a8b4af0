//! Following `gix-server-sdk::error::SdkError`'s and `gix-blame`'s `thiserror` conventions.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("'{value}' is not a valid range; expected START,END with START >= 1 and START <= END")]
    InvalidRange { value: String },

    #[error("could not discover a git repository at '{path}'")]
    Discover { path: String, #[source] source: gix::discover::Error },

    #[error("could not resolve revision '{revision}'")]
    RevParse {
        revision: String,
        #[source]
        source: gix::revision::spec::parse::Error,
    },

    #[error("HEAD could not be resolved")]
    Head(#[source] gix::reference::head_id::Error),

    #[error(transparent)]
    Blame(#[from] blame::Error),

    #[error("failed to read '.mailmap'")]
    Mailmap(#[source] std::io::Error),
}
