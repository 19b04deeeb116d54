//! View contracts.
//!
//! A registered view has two faces:
//!
//! - [`View`] is the internal render contract. It receives the caller's props
//!   and a class name that only the renderer supplies.
//! - [`SsrView`] is what callers see after wrapping. It takes props alone; a
//!   `className` prop passed from outside is dropped before the inner view runs.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Props handed to a view.
pub type Props = Map<String, Value>;

/// Prop name reserved for the renderer.
pub const CLASS_NAME_PROP: &str = "className";

/// Export name to server-renderable wrapper.
pub type SsrViews = BTreeMap<String, Arc<dyn SsrView>>;

/// Everything a view gets at render time.
#[derive(Debug, Clone, Copy)]
pub struct ViewInput<'a> {
    pub props: &'a Props,
    pub class_name: &'a str,
}

/// A component as registered by the host application.
pub trait View: Send + Sync + 'static {
    /// Render to markup.
    fn render(&self, input: &ViewInput<'_>) -> String;
}

impl<F> View for F
where
    F: Fn(&ViewInput<'_>) -> String + Send + Sync + 'static,
{
    fn render(&self, input: &ViewInput<'_>) -> String {
        self(input)
    }
}

/// A wrapped view, renderable on the server with public props only.
pub trait SsrView: Send + Sync {
    /// Export name the view was registered under.
    fn name(&self) -> &str;

    /// Render with caller props.
    fn render(&self, props: &Props) -> String;
}

impl fmt::Debug for dyn SsrView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsrView").field("name", &self.name()).finish()
    }
}

/// Turns a registered view into its server-renderable form.
///
/// Applied once per export when the export is registered.
pub trait ViewWrapper: Send + Sync + 'static {
    fn wrap(&self, name: &str, view: Arc<dyn View>) -> Arc<dyn SsrView>;
}

/// Default wrapper: supplies `{prefix}{name}` as the class name.
#[derive(Debug, Clone)]
pub struct BaseWrapper {
    prefix: String,
}

impl Default for BaseWrapper {
    fn default() -> Self {
        Self::new("ssr-")
    }
}

impl BaseWrapper {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl ViewWrapper for BaseWrapper {
    fn wrap(&self, name: &str, view: Arc<dyn View>) -> Arc<dyn SsrView> {
        Arc::new(BaseView {
            name: name.to_string(),
            class_name: format!("{}{}", self.prefix, name),
            view,
        })
    }
}

struct BaseView {
    name: String,
    class_name: String,
    view: Arc<dyn View>,
}

impl SsrView for BaseView {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &Props) -> String {
        let props = public_props(props);
        self.view.render(&ViewInput {
            props: &props,
            class_name: &self.class_name,
        })
    }
}

/// Strip the renderer-owned prop, copying only when it is present.
#[must_use]
pub fn public_props(props: &Props) -> Cow<'_, Props> {
    if props.contains_key(CLASS_NAME_PROP) {
        let mut owned = props.clone();
        owned.remove(CLASS_NAME_PROP);
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(props)
    }
}

/// Named views passed to one `with_components` call.
#[derive(Clone, Default)]
pub struct ViewExports {
    views: BTreeMap<String, Arc<dyn View>>,
}

impl ViewExports {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an export. A repeated name replaces the earlier view.
    #[must_use]
    pub fn view(mut self, name: impl Into<String>, view: impl View) -> Self {
        self.views.insert(name.into(), Arc::new(view));
        self
    }

    /// Add an already shared view.
    #[must_use]
    pub fn shared(mut self, name: impl Into<String>, view: Arc<dyn View>) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl fmt::Debug for ViewExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.views.keys()).finish()
    }
}

impl IntoIterator for ViewExports {
    type Item = (String, Arc<dyn View>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Arc<dyn View>>;

    fn into_iter(self) -> Self::IntoIter {
        self.views.into_iter()
    }
}

impl FromIterator<(String, Arc<dyn View>)> for ViewExports {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn View>)>>(iter: I) -> Self {
        Self {
            views: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn navbar(input: &ViewInput<'_>) -> String {
        let user = input.props.get("username").and_then(Value::as_str).unwrap_or("");
        let leaked = input.props.contains_key(CLASS_NAME_PROP);
        format!("<nav class=\"{}\" data-leaked=\"{leaked}\">{user}</nav>", input.class_name)
    }

    fn props(value: Value) -> Props {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_base_wrapper_supplies_class_name() {
        let wrapped = BaseWrapper::default().wrap("Navbar", Arc::new(navbar));
        let html = wrapped.render(&props(json!({"username": "shmuel"})));

        assert_eq!(wrapped.name(), "Navbar");
        assert_eq!(html, "<nav class=\"ssr-Navbar\" data-leaked=\"false\">shmuel</nav>");
    }

    #[test]
    fn test_caller_class_name_is_dropped() {
        let wrapped = BaseWrapper::new("x-").wrap("Navbar", Arc::new(navbar));
        let html = wrapped.render(&props(json!({"username": "a", "className": "evil"})));

        assert!(html.contains("class=\"x-Navbar\""));
        assert!(html.contains("data-leaked=\"false\""));
    }

    #[test]
    fn test_public_props_borrows_when_clean() {
        let p = props(json!({"a": 1}));
        assert!(matches!(public_props(&p), Cow::Borrowed(_)));
    }

    #[test]
    fn test_view_exports_names_sorted() {
        let exports = ViewExports::new().view("b", navbar).view("a", navbar);
        assert_eq!(exports.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(exports.len(), 2);
    }
}
