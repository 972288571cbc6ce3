//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# medidrop configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# The API key does not belong here: put it in secrets.toml next to this file
#   [gemini]
#   api_key = "..."
# or export GEMINI_API_KEY.

[model]
# name = "gemini-2.0-flash"   # gemini-2.0-flash, gemini-1.5-flash, gemini-1.5-pro
# api_url_template = "https://generative.googleapis.com/v1beta2/models/{model}:generate"
# temperature = 0.2           # 0.0-2.0
# candidate_count = 1         # 1-8
# max_output_tokens = 1024    # 1-8192
# request_timeout_secs = 30   # 1-300

[retry]
# max_retries = 5             # 1-10
# backoff_base_secs = 1.0     # 1.0-10.0

[history]
# context_window = 20         # 1-200
# recovery_keep = 12          # 0-200

[csv_log]
# auto_log = false
# path = "/tmp/chatbot_logs.csv"

[persona]
# system_prompt = "..."
# rate_limit_apology = "..."

[server]
# bind = "127.0.0.1"
# port = 8501                 # 1024-65535
# idle_timeout_secs = 1800    # 10-86400

[logging]
# level = "info"              # trace, debug, info, warn, error
"##
    .to_string()
}
