//! Typed operations over the vendor workbench API.
//!
//! Every response is wrapped in a `{code, msg, data}` envelope; `code == 1`
//! means success and anything else is surfaced as [`ClientError::Api`].

pub mod endpoints;
mod models;

pub use models::{FileItem, Quota};

use std::path::Path;

use serde_json::{Value, json};

use crate::client::{ClientError, CloudClient};
use models::value_string;

/// Validate the response envelope and hand the full payload back.
fn envelope(payload: Value) -> Result<Value, ClientError> {
    if !payload.is_object() {
        return Err(ClientError::unexpected(format!(
            "non-object response: {payload}"
        )));
    }

    match payload.get("code") {
        None | Some(Value::Null) => Ok(payload),
        Some(code) if code.as_i64() == Some(1) => Ok(payload),
        Some(code) => {
            let code = code.as_i64().unwrap_or(-1);
            let msg = payload
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            Err(ClientError::Api { code, msg })
        }
    }
}

fn data_of(payload: Value) -> Value {
    payload.get("data").cloned().unwrap_or(Value::Null)
}

pub async fn get_quota(client: &CloudClient) -> Result<Quota, ClientError> {
    let payload = envelope(client.call(&endpoints::QUOTA_GET_USER_STORE).await?)?;
    Ok(Quota::from_data(&data_of(payload)))
}

pub async fn list_files(
    client: &CloudClient,
    page: u32,
    limit: u32,
) -> Result<Vec<FileItem>, ClientError> {
    let body = json!({"page": page, "limit": limit});
    let payload = envelope(client.call_with_json(&endpoints::FILES_LIST, &body).await?)?;

    let items = match data_of(payload) {
        Value::Array(rows) => rows.iter().map(FileItem::from_row).collect(),
        _ => Vec::new(),
    };
    Ok(items)
}

pub async fn get_download_url(client: &CloudClient, file_id: i64) -> Result<String, ClientError> {
    let body = json!({"id": file_id});
    let payload = envelope(
        client
            .call_with_json(&endpoints::FILES_DOWNLOAD_URL, &body)
            .await?,
    )?;
    Ok(data_of(payload).as_str().unwrap_or_default().to_string())
}

pub async fn delete_files(client: &CloudClient, file_ids: &[i64]) -> Result<(), ClientError> {
    let body = json!({"idArr": file_ids});
    envelope(client.call_with_json(&endpoints::FILES_DELETE, &body).await?)?;
    Ok(())
}

pub async fn get_gcode_info(client: &CloudClient, gcode_id: i64) -> Result<Value, ClientError> {
    let query = [("id", gcode_id.to_string())];
    let payload = envelope(
        client
            .call_with_query(&endpoints::GCODE_INFO, &query)
            .await?,
    )?;
    Ok(data_of(payload))
}

pub async fn list_printers(
    client: &CloudClient,
    query: &[(&str, String)],
) -> Result<Value, ClientError> {
    let payload = envelope(
        client
            .call_with_query(&endpoints::PRINTERS_LIST, query)
            .await?,
    )?;
    Ok(data_of(payload))
}

pub async fn get_printer_info(client: &CloudClient, printer_id: i64) -> Result<Value, ClientError> {
    let body = json!({"id": printer_id});
    let payload = envelope(client.call_with_json(&endpoints::PRINTERS_INFO, &body).await?)?;
    Ok(data_of(payload))
}

pub async fn get_printer_info_v2(
    client: &CloudClient,
    printer_id: i64,
) -> Result<Value, ClientError> {
    let query = [("id", printer_id.to_string())];
    let payload = envelope(
        client
            .call_with_query(&endpoints::PRINTERS_INFO_V2, &query)
            .await?,
    )?;
    Ok(data_of(payload))
}

pub async fn get_projects(
    client: &CloudClient,
    printer_id: i64,
    print_status: i64,
    page: u32,
    limit: u32,
) -> Result<Value, ClientError> {
    let query = [
        ("limit", limit.to_string()),
        ("page", page.to_string()),
        ("print_status", print_status.to_string()),
        ("printer_id", printer_id.to_string()),
    ];
    let payload = envelope(
        client
            .call_with_query(&endpoints::PROJECTS_LIST, &query)
            .await?,
    )?;
    Ok(data_of(payload))
}

/// Upload a local file into cloud storage.
///
/// The vendor flow is three-step: reserve space (which returns a presigned
/// URL), PUT the bytes there, then register and release the reservation.
/// Returns the new file id.
pub async fn upload_file(
    client: &CloudClient,
    path: &Path,
    name: Option<&str>,
) -> Result<String, ClientError> {
    let filename = match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let size = tokio::fs::metadata(path).await?.len();

    let lock_body = json!({"name": filename, "size": size, "is_temp_file": 0});
    let lock_payload = envelope(
        client
            .call_with_json(&endpoints::UPLOAD_LOCK_STORAGE_SPACE, &lock_body)
            .await?,
    )?;
    let lock_data = data_of(lock_payload);
    let lock_id = lock_data.get("id").cloned().unwrap_or(Value::Null);
    let pre_sign = lock_data
        .get("preSignUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or(ClientError::MissingPresignUrl)?
        .to_string();

    client.put_presigned(&pre_sign, path).await?;

    let new_body = json!({"user_lock_space_id": lock_id});
    let new_payload = envelope(
        client
            .call_with_json(&endpoints::UPLOAD_NEW_UPLOAD_FILE, &new_body)
            .await?,
    )?;
    let file_id = data_of(new_payload)
        .get("id")
        .and_then(value_string)
        .unwrap_or_default();

    let unlock_body = json!({"id": lock_id, "is_delete_cos": 0});
    envelope(
        client
            .call_with_json(&endpoints::UPLOAD_UNLOCK_STORAGE_SPACE, &unlock_body)
            .await?,
    )?;

    Ok(file_id)
}

/// Build the form for a print order, forcing `data.file_id` to match the
/// explicit file id when the caller-supplied payload disagrees.
fn print_order_form(
    file_id: &str,
    printer_id: &str,
    project_id: &str,
    order_id: &str,
    is_delete_file: &str,
    data_payload: &Value,
) -> Vec<(String, String)> {
    let payload_file_id = data_payload
        .get("file_id")
        .and_then(value_string)
        .unwrap_or_default();

    let data = if file_id != payload_file_id {
        let mut reconciled = data_payload.clone();
        if let Some(obj) = reconciled.as_object_mut() {
            obj.insert("file_id".to_string(), Value::String(file_id.to_string()));
        }
        reconciled
    } else {
        data_payload.clone()
    };

    vec![
        ("printer_id".to_string(), printer_id.to_string()),
        ("project_id".to_string(), project_id.to_string()),
        ("order_id".to_string(), order_id.to_string()),
        ("is_delete_file".to_string(), is_delete_file.to_string()),
        (
            "data".to_string(),
            serde_json::to_string(&data).unwrap_or_default(),
        ),
    ]
}

/// Issue a print order for a previously uploaded file.
pub async fn send_print_order(
    client: &CloudClient,
    file_id: &str,
    printer_id: &str,
    project_id: &str,
    order_id: &str,
    is_delete_file: &str,
    data_payload: &Value,
) -> Result<Value, ClientError> {
    let form = print_order_form(
        file_id,
        printer_id,
        project_id,
        order_id,
        is_delete_file,
        data_payload,
    );
    envelope(
        client
            .call_with_form(&endpoints::PRINT_SEND_ORDER, &form)
            .await?,
    )
}

/// Order id for the camera/video event observed in the vendor app.
pub const VIDEO_ORDER_ID: i64 = 1001;

/// Issue a bare order (used for the video stream toggle).
pub async fn send_video_order(
    client: &CloudClient,
    printer_id: i64,
    order_id: i64,
) -> Result<Value, ClientError> {
    let form = vec![
        ("printer_id".to_string(), printer_id.to_string()),
        ("order_id".to_string(), order_id.to_string()),
    ];
    envelope(
        client
            .call_with_form(&endpoints::PRINT_SEND_ORDER, &form)
            .await?,
    )
}
