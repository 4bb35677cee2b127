//! Tipos de dados para requisições e respostas da API de jobs da Kie.ai.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato esperado pelos endpoints `createTask` e
//! `file-base64-upload`, incluindo o envelope de callback que os provedores
//! enviam ao inbox de notificações.

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o endpoint `/api/v1/jobs/createTask`.
///
/// O campo `input` é um objeto JSON arbitrário porque cada provedor
/// define seu próprio vocabulário de campos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Identificador do modelo/provedor (ex.: "nano-banana-pro").
    pub model: String,
    /// URL do inbox que receberá a notificação assíncrona de conclusão.
    #[serde(rename = "callBackUrl")]
    pub callback_url: String,
    /// Payload específico do provedor.
    pub input: serde_json::Value,
}

/// Resposta do endpoint `createTask`.
///
/// Um HTTP 200 ainda pode carregar uma falha lógica: o campo `code`
/// precisa ser 200 para a submissão ter sido aceita.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    /// Código lógico da API (200 = aceito).
    pub code: i64,
    /// Mensagem de erro ou status da API.
    #[serde(default)]
    pub msg: Option<String>,
    /// Presente apenas quando a submissão foi aceita.
    #[serde(default)]
    pub data: Option<TaskData>,
}

/// Dados da tarefa criada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskData {
    /// Identificador opaco da tarefa, atribuído pelo provedor.
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// Corpo da requisição para o endpoint `file-base64-upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Imagem codificada como data URL (`data:image/jpeg;base64,...`).
    #[serde(rename = "base64Data")]
    pub base64_data: String,
    /// Nome do arquivo no armazenamento remoto.
    pub filename: String,
    /// Diretório de destino no armazenamento remoto.
    #[serde(rename = "uploadPath")]
    pub upload_path: String,
}

/// Resposta do endpoint de upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `true` quando o arquivo foi armazenado.
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<UploadData>,
}

/// Dados do arquivo armazenado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadData {
    /// URL estável do arquivo hospedado.
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

/// Envelope de notificação que o provedor envia ao inbox quando a
/// tarefa conclui (com sucesso ou falha).
///
/// O local do resultado varia por envelope: alguns trazem `resultUrls`
/// diretamente em `data`, outros trazem `resultJson` — uma *string* JSON
/// aninhada que contém a lista `resultUrls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEnvelope {
    /// Mensagem do provedor (presente em falhas).
    #[serde(default)]
    pub msg: Option<String>,
    pub data: CallbackData,
}

/// Carga útil do envelope de callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackData {
    /// Identificador da tarefa a que a notificação se refere.
    #[serde(rename = "taskId")]
    pub task_id: String,
    /// Estado no vocabulário do provedor ("success", "fail", ...).
    #[serde(default)]
    pub state: Option<String>,
    /// String JSON aninhada contendo `resultUrls` (caminho indireto).
    #[serde(rename = "resultJson", default)]
    pub result_json: Option<String>,
    /// Lista direta de URLs de resultado (caminho direto).
    #[serde(rename = "resultUrls", default)]
    pub result_urls: Option<Vec<String>>,
}

/// Conteúdo de `resultJson` após o segundo parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(rename = "resultUrls", default)]
    pub result_urls: Vec<String>,
}
