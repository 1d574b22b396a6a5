use crate::payload::{parse_file_list, parse_snapshot, parse_sweep, DeviceFile, SweepData};
use edugrid_config::DeviceConfig;
use edugrid_core::{Result, Snapshot, UiError};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Response};
use tracing::debug;

/// Control element ids understood by the firmware's `/updatevalues` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    /// Toggle the MPP tracker on/off.
    MppSwitch,
    /// Raise PWM duty by one step.
    PwmIncrement,
    /// Lower PWM duty by one step.
    PwmDecrement,
    /// Set PWM duty to an explicit value.
    PwmSlider,
    /// Request an explicit mode (`AUTO` / `MANUAL`).
    ModeLabel,
    /// Toggle SD-card logging.
    LoggingLabel,
    /// Restart the device.
    Reboot,
}

impl ControlId {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlId::MppSwitch    => "1",
            ControlId::PwmIncrement => "2",
            ControlId::PwmDecrement => "3",
            ControlId::PwmSlider    => "4",
            ControlId::ModeLabel    => "mode_label",
            ControlId::LoggingLabel => "logging_label",
            ControlId::Reboot       => "id_reboot_request",
        }
    }
}

/// HTTP client for the EduGrid firmware's control and sweep API.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    base:   String,
    client: Client,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UiError::Http(format!("client: {e}")))?;

        Ok(Self { base: config.http_base(), client })
    }

    /// Base URL requests are sent to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /updatevalues?ID=..&STATE=..[&STATE2=..]`.
    ///
    /// The firmware always answers `OK`; the body is ignored.
    pub async fn send_update(&self, id: ControlId, state: &str, state2: Option<&str>) -> Result<()> {
        let query = update_query(id, state, state2);
        debug!("update {} = {state}", id.as_str());
        self.get("/updatevalues", &query).await.map(drop)
    }

    /// Ask the firmware to begin an I-V sweep.
    pub async fn start_sweep(&self) -> Result<()> {
        self.get("/ivsweep/start", &[]).await.map(drop)
    }

    /// Fetch the sweep collected so far.
    pub async fn fetch_sweep(&self) -> Result<SweepData> {
        let body = self.get("/ivsweep/data", &[]).await?;
        parse_sweep(&body)
    }

    /// Fetch a single measurement snapshot.
    pub async fn fetch_now(&self) -> Result<Snapshot> {
        let body = self.get("/api/now", &[]).await?;
        parse_snapshot(&body)
    }

    /// Re-zero the current sensors. Run with the PV source and load disconnected.
    pub async fn calibrate_zero(&self) -> Result<()> {
        self.get("/calibrate_zero", &[]).await.map(drop)
    }

    // ── Flash files ───────────────────────────────────────────────────────────

    /// Files stored on the device (logs, web assets, config).
    pub async fn list_files(&self) -> Result<Vec<DeviceFile>> {
        let body = self.get("/listfiles", &[]).await?;
        Ok(parse_file_list(&body))
    }

    /// Raw contents of the file at `path`.
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
        let res = self.send("/filehandle", &file_query(path, "download")).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|e| UiError::Http(format!("GET /filehandle: read body: {e}")))?;
        Ok(bytes.to_vec())
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        self.get("/filehandle", &file_query(path, "delete")).await.map(drop)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        self.send(path, query)
            .await?
            .text()
            .await
            .map_err(|e| UiError::Http(format!("GET {path}: read body: {e}")))
    }

    /// Send a GET and fail on any non-2xx status.
    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base, path);

        let res = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .query(query)
            .send()
            .await
            .map_err(|e| UiError::Http(format!("GET {path}: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(UiError::Http(format!("GET {path}: {status}")));
        }
        Ok(res)
    }
}

fn file_query(path: &str, action: &str) -> [(&'static str, String); 2] {
    [("name", path.to_string()), ("action", action.to_string())]
}

/// Query parameters for `/updatevalues`. Values are URL-encoded by the client.
pub fn update_query(id: ControlId, state: &str, state2: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("ID", id.as_str().to_string()), ("STATE", state.to_string())];
    if let Some(state2) = state2 {
        query.push(("STATE2", state2.to_string()));
    }
    query
}
