pub fn download_url(base_url: &str, id: &str) -> String {
    format!("{}/api/documents/{}/download", base_url.trim_end_matches('/'), id)
}

pub fn callback_url(base_url: &str, id: &str) -> String {
    format!("{}/api/documents/{}/callback", base_url.trim_end_matches('/'), id)
}
