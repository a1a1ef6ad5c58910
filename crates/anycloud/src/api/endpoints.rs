//! Routing table for the vendor workbench API.
//!
//! Paths were recovered from a HAR capture of the web app; update here if
//! the vendor moves an endpoint. The table is deliberately opaque: nothing
//! else in the crate interprets these paths.

use reqwest::Method;

pub const BASE_URL: &str = "https://cloud-universe.anycubic.com";

/// One logical endpoint: HTTP verb plus path under [`BASE_URL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

pub const AUTH_GET_OAUTH_TOKEN: Endpoint = Endpoint {
    method: Method::GET,
    path: "/p/p/workbench/api/v3/public/getoauthToken",
};
pub const AUTH_LOGIN_WITH_ACCESS_TOKEN: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/v3/public/loginWithAccessToken",
};

pub const QUOTA_GET_USER_STORE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/getUserStore",
};

pub const FILES_LIST: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/files",
};
pub const FILES_DOWNLOAD_URL: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/getDowdLoadUrl",
};
pub const FILES_DELETE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/delFiles",
};
pub const FILES_RENAME: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/renameFile",
};
pub const FILES_UPLOAD_STATUS: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/index/getUploadStatus",
};

pub const GCODE_INFO: Endpoint = Endpoint {
    method: Method::GET,
    path: "/p/p/workbench/api/api/work/gcode/info",
};

pub const PRINTERS_LIST: Endpoint = Endpoint {
    method: Method::GET,
    path: "/p/p/workbench/api/work/printer/getPrinters",
};
pub const PRINTERS_INFO: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/printer/Info",
};
pub const PRINTERS_INFO_V2: Endpoint = Endpoint {
    method: Method::GET,
    path: "/p/p/workbench/api/v2/printer/info",
};

pub const PROJECTS_LIST: Endpoint = Endpoint {
    method: Method::GET,
    path: "/p/p/workbench/api/work/project/getProjects",
};

pub const UPLOAD_LOCK_STORAGE_SPACE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/v2/cloud_storage/lockStorageSpace",
};
pub const UPLOAD_NEW_UPLOAD_FILE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/v2/profile/newUploadFile",
};
pub const UPLOAD_UNLOCK_STORAGE_SPACE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/v2/cloud_storage/unlockStorageSpace",
};

pub const PRINT_SEND_ORDER: Endpoint = Endpoint {
    method: Method::POST,
    path: "/p/p/workbench/api/work/operation/sendOrder",
};
