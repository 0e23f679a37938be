// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// HTTP-Tasks und Render-Task teilen sich Engine und Settings über Mutexe.

pub mod http;
pub mod render;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use render::led_render_task;
pub use wifi::{connection_task, dhcp_task, net_task};
