use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use super::types::{
    AddFamilyRequest, ConnectRequest, ConnectResponse, DeleteDataRequest, ErrorResponse,
    RowKeysResponse,
};
use super::DataSourceApi;
use crate::error::ApiError;
use crate::models::{CellWrite, ConfigFile, FamilyMap, RowDetail, RowKeyQuery};

/// [`DataSourceApi`] over HTTP, rooted at the backend's base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        // Without a trailing slash `Url::join` would drop the last path segment
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(HttpBackend {
            client,
            base: Url::parse(&base)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, id: &str, action: &str) -> Result<Url, ApiError> {
        let mut path = format!("api/datasource/{}", urlencoding::encode(id));
        if !action.is_empty() {
            path.push('/');
            path.push_str(action);
        }
        Ok(self.base.join(&path)?)
    }

    async fn tables_from(response: Response) -> Result<Vec<String>, ApiError> {
        let response = check(response).await?;
        let body: ConnectResponse = response.json().await?;
        Ok(body.tables)
    }
}

/// Turn any non-2xx response into [`ApiError::Status`], keeping the backend's message.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("Backend answered {} with body: {}", status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        message: ErrorResponse::extract(&body),
    })
}

fn file_part(file: &ConfigFile) -> Part {
    Part::bytes(file.contents.clone()).file_name(file.file_name.clone())
}

#[async_trait]
impl DataSourceApi for HttpBackend {
    async fn upload_config(
        &self,
        id: &str,
        core_site: &ConfigFile,
        hbase_site: &ConfigFile,
    ) -> Result<(), ApiError> {
        let form = Form::new()
            .part("core-site", file_part(core_site))
            .part("hbase-site", file_part(hbase_site));

        let response = self
            .client
            .post(self.endpoint(id, "upload-config")?)
            .multipart(form)
            .send()
            .await?;
        let response = check(response).await?;

        // A 2xx carrying an error payload is still a rejected upload
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match ErrorResponse::extract(&body) {
            Some(message) => Err(ApiError::Status {
                status,
                message: Some(message),
            }),
            None => Ok(()),
        }
    }

    async fn connect(&self, id: &str, host: &str) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .post(self.endpoint(id, "connect")?)
            .json(&ConnectRequest {
                host: host.to_string(),
            })
            .send()
            .await?;
        Self::tables_from(response).await
    }

    async fn reconnect(&self, id: &str, host: &str) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .post(self.endpoint(id, "reconnect")?)
            .json(&ConnectRequest {
                host: host.to_string(),
            })
            .send()
            .await?;
        Self::tables_from(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self.client.delete(self.endpoint(id, "")?).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn list_rows(&self, id: &str, query: &RowKeyQuery) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(id, "list-rows")?)
            .query(&query.params())
            .send()
            .await?;
        let body: RowKeysResponse = check(response).await?.json().await?;
        Ok(body.rowkeys)
    }

    async fn query_row(&self, id: &str, table: &str, row_key: &str) -> Result<RowDetail, ApiError> {
        let response = self
            .client
            .get(self.endpoint(id, "query")?)
            .query(&[("table", table), ("rowkey", row_key)])
            .send()
            .await?;
        let families: FamilyMap = check(response).await?.json().await?;
        Ok(RowDetail {
            row_key: row_key.to_string(),
            families,
        })
    }

    async fn add_data(&self, id: &str, cell: &CellWrite) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(id, "add-data")?)
            .json(cell)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_data(&self, id: &str, table: &str, row_key: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(id, "delete-data")?)
            .json(&DeleteDataRequest {
                table: table.to_string(),
                row_key: row_key.to_string(),
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn add_family(&self, id: &str, table: &str, family_name: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(id, "add-family")?)
            .json(&AddFamilyRequest {
                table: table.to_string(),
                family_name: family_name.to_string(),
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
