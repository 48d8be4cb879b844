use alloc::string::String;

use super::InstantiateErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum LoadErrorKind {
    #[error("Registration script {file} failed: {source}")]
    Script {
        file: String,
        #[source]
        source: InstantiateErrorKind,
    },
}
