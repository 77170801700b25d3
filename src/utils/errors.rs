// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::fetcher::FetchError;
use thiserror::Error;

/// Worker错误类型
///
/// 只在工作单元内部流转，不会越过单元边界
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid detail link {href}: {source}")]
    InvalidLink {
        href: String,
        source: url::ParseError,
    },
}
