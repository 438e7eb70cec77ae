//! Heatmap service client
//!
//! Uploads exported CSV tables and fetches rendered heatmap images from the
//! generator service over the padded-header TCP protocol.

use crate::config::HeatmapSettings;
use crate::error::RankingError;
use crate::heatmap::protocol::{
    read_block, read_payload, write_header, write_payload, FrameHeader, StatusReply,
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Trait for talking to the heatmap generator
#[async_trait]
pub trait HeatmapClient: Send + Sync {
    /// Upload a CSV table under `filename`
    async fn upload_csv(&self, filename: &str, contents: &[u8]) -> crate::error::Result<()>;

    /// Request the heatmap image for a previously uploaded file
    async fn request_heatmap(&self, filename: &str, colors: &str)
        -> crate::error::Result<Vec<u8>>;
}

/// Strip any directory components; the servers only accept bare file names
pub fn transfer_name(filename: &str) -> crate::error::Result<String> {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            RankingError::InvalidFileName {
                filename: filename.to_string(),
            }
            .into()
        })
}

/// Send an upload over an established stream
pub async fn send_upload<S>(stream: &mut S, filename: &str, contents: &[u8]) -> crate::error::Result<()>
where
    S: AsyncWrite + Unpin,
{
    write_header(stream, &FrameHeader::for_file(filename, contents.len() as u64)).await?;
    write_payload(stream, contents).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Run a heatmap request over an established stream and return the image bytes
pub async fn exchange_heatmap_request<S>(
    stream: &mut S,
    filename: &str,
    colors: &str,
) -> crate::error::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    write_header(stream, &FrameHeader::new(filename, colors)).await?;
    stream.flush().await?;

    let status = StatusReply::decode(&read_block(stream).await?)?;
    if !status.is_success() {
        return Err(RankingError::Transfer {
            message: format!(
                "heatmap request rejected with code {}: {}",
                status.code, status.message
            ),
        }
        .into());
    }

    let image = FrameHeader::decode(&read_block(stream).await?)?;
    let size = image.size()?;
    debug!("Receiving heatmap image '{}' ({} bytes)", image.name, size);

    read_payload(stream, size).await
}

/// TCP implementation of [`HeatmapClient`]
#[derive(Debug, Clone)]
pub struct TcpHeatmapClient {
    settings: HeatmapSettings,
}

impl TcpHeatmapClient {
    pub fn new(settings: HeatmapSettings) -> Self {
        Self { settings }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_seconds)
    }

    async fn connect(&self, port: u16) -> crate::error::Result<TcpStream> {
        let address = format!("{}:{}", self.settings.host, port);
        TcpStream::connect(&address).await.map_err(|e| {
            RankingError::Transfer {
                message: format!("could not connect to {}: {}", address, e),
            }
            .into()
        })
    }
}

fn timed_out(operation: &str, timeout: Duration) -> anyhow::Error {
    RankingError::Transfer {
        message: format!("{} timed out after {:?}", operation, timeout),
    }
    .into()
}

#[async_trait]
impl HeatmapClient for TcpHeatmapClient {
    async fn upload_csv(&self, filename: &str, contents: &[u8]) -> crate::error::Result<()> {
        let name = transfer_name(filename)?;
        let timeout = self.timeout();

        let upload = async {
            let mut stream = self.connect(self.settings.upload_port).await?;
            send_upload(&mut stream, &name, contents).await
        };

        tokio::time::timeout(timeout, upload)
            .await
            .map_err(|_| timed_out("CSV upload", timeout))??;

        info!(
            "Uploaded '{}' ({} bytes) to {}:{}",
            name,
            contents.len(),
            self.settings.host,
            self.settings.upload_port
        );
        Ok(())
    }

    async fn request_heatmap(
        &self,
        filename: &str,
        colors: &str,
    ) -> crate::error::Result<Vec<u8>> {
        let name = transfer_name(filename)?;
        let timeout = self.timeout();

        let request = async {
            let mut stream = self.connect(self.settings.request_port).await?;
            exchange_heatmap_request(&mut stream, &name, colors).await
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(image)) => {
                info!("Received heatmap for '{}' ({} bytes)", name, image.len());
                Ok(image)
            }
            Ok(Err(e)) => {
                warn!("Heatmap request for '{}' failed: {}", name, e);
                Err(e)
            }
            Err(_) => Err(timed_out("heatmap request", timeout)),
        }
    }
}
