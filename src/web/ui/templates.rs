use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub device_name: String,
    pub device_id: String,
    pub refresh_ms: u64,
}
