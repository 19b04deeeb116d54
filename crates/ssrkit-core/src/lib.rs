#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod bundler;
pub mod codes;
pub mod compiler;
pub mod config;
pub mod error;
pub mod server;
pub mod statics;
pub mod version;
pub mod view;

pub use bundler::{BuildMessage, BuildOutput, Bundle, Bundler, EsbuildBundler};
pub use compiler::{
    create_compiler, CompileError, CompiledComponents, ComponentCompiler, Registration,
    RequestHandler, SessionHandler,
};
pub use config::{Config, ProjectConfig};
pub use error::Error;
pub use server::{
    AdditionalComponents, BundleCollector, RenderServer, ServeOptions, SessionRuntime, StaticHost,
};
pub use statics::RouterStatics;
pub use version::VERSION;
pub use view::{BaseWrapper, Props, SsrView, SsrViews, View, ViewExports, ViewInput, ViewWrapper};
