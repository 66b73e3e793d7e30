use super::chat_model_builder::ChatModelBuilder;

const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

impl ChatModelBuilder {
    /// Sets the base URL for API requests; wins over `options.baseURL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.state.base_url = Some(url.into());
        self
    }

    /// Routes every request through the given proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.state.proxy = Some(proxy.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the OpenAI organization header.
    pub fn organization(self, organization_id: impl Into<String>) -> Self {
        self.header(ORGANIZATION_HEADER, organization_id)
    }
}
