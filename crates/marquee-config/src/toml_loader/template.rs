//! Default TOML config template with inline documentation.

/// Generate the default TOML config content with comments.
pub(super) fn default_config_toml() -> &'static str {
    r##"# Marquee Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 3000
# client_ip_header = "x-real-ip"   # set by the reverse proxy
# cors_allowed_origins = []        # empty = any origin

[store]
# backend = "memory"               # memory, sqlite
# database_url = "sqlite://marquee.db"
# consistency = "atomic"           # atomic, stepwise

[registry]
# activity_window_secs = 30        # 1-86400
# sweep_interval_secs = 0          # 0 = sweep only on requests

[reporter]
# server_url = "http://127.0.0.1:3000"
# interval_secs = 60               # 1-86400
# cookie_name = "visitor_id"
# cookie_ttl_hours = 24            # 1-8760
# cookie_jar = "/path/to/cookies.json"
# request_timeout_secs = 0         # 0-300, 0 = client default

[logging]
# level = "info"                   # trace, debug, info, warn, error
"##
}
