//! Tipos de erro para o cliente da API Kie.ai.
//!
//! Define [`KieError`] com variantes para erros HTTP, falhas lógicas
//! (HTTP 200 com `code != 200`), respostas malformadas e erros de rede.
//! Usa `thiserror` para derivar `Display` e `Error` automaticamente.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API da Kie.ai.
#[derive(Debug, Error)]
pub enum KieError {
    /// Erro HTTP retornado pela API (ex.: 401 chave inválida, 500 erro interno).
    /// Contém o código de status e a mensagem de erro do corpo da resposta.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A API respondeu HTTP 200 mas o código lógico indica falha
    /// (ex.: créditos insuficientes, modelo inexistente).
    #[error("API rejected the request (code {code}): {message}")]
    LogicalError { code: i64, message: String },

    /// A resposta não tem a forma esperada (JSON inválido ou campos ausentes).
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
