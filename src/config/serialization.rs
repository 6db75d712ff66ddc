//! Config serialization to TOML
//!
//! Single source of truth for config file format. Secrets are never written;
//! they are left as commented hints pointing at the environment variables.

use super::Config;

impl Config {
    /// Render the config as a commented TOML document
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# khoros-reader configuration\n");
        output.push_str("# Environment variables override every value in this file.\n\n");
        output.push_str(&format!(
            "page_size = {}            # KHOROS_PAGE_SIZE\n",
            self.page_size
        ));
        output.push_str(&format!(
            "request_timeout_secs = {}\n",
            self.request_timeout_secs
        ));

        output.push_str(&self.community_to_toml());
        output.push_str(&self.gemini_to_toml());
        output.push_str(&self.logging_to_toml());
        output
    }

    fn community_to_toml(&self) -> String {
        let community = &self.community;
        let mut output = String::from("\n[community]\n");
        output.push_str(&format!(
            "hostname = {:?}          # KHOROS_HOSTNAME\n",
            community.hostname
        ));
        output.push_str(&format!(
            "tapestry = {:?}          # KHOROS_TAPESTRY\n",
            community.tapestry
        ));
        match &community.base_url {
            Some(url) => output.push_str(&format!("base_url = {:?}\n", url)),
            None => output.push_str("# base_url = \"https://staging.example.com\"   # KHOROS_BASE_URL\n"),
        }
        output.push_str(&format!(
            "username = {:?}          # KHOROS_USERNAME\n",
            community.username
        ));
        output.push_str("# password = \"...\"       # prefer KHOROS_PASSWORD\n");
        output
    }

    fn gemini_to_toml(&self) -> String {
        let mut output = String::from("\n[gemini]\n");
        output.push_str(&format!("model = {:?}\n", self.gemini.model));
        output.push_str(&format!("base_url = {:?}\n", self.gemini.base_url));
        output.push_str("# api_key = \"...\"        # prefer GEMINI_API_KEY\n");
        output
    }

    fn logging_to_toml(&self) -> String {
        let logging = &self.logging;
        let mut output = String::from("\n[logging]\n");
        output.push_str(&format!("level = {:?}\n", logging.level));
        output.push_str(&format!("file_enabled = {}\n", logging.file_enabled));
        output.push_str(&format!(
            "file_dir = {:?}\n",
            logging.file_dir.display().to_string()
        ));
        output.push_str(&format!(
            "file_rotation = {:?}     # hourly, daily, never\n",
            logging.file_rotation.as_str()
        ));
        output.push_str(&format!("file_prefix = {:?}\n", logging.file_prefix));
        output
    }
}
