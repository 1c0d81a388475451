//! Compile-time route collection using inventory
//!
//! `#[get]` and `#[post]` submit one [`RouteDeclaration`] per handler. The
//! route table's auto-scan reads them back filtered by module path, so
//! discovery never walks anything at runtime.

use crate::Handler;

/// A route handler declared somewhere in the binary
#[derive(Debug)]
pub struct RouteDeclaration {
    /// `module_path!()` of the declaring module
    pub module: &'static str,
    /// Handler function name
    pub name: &'static str,
    /// Builds the tagged handler
    pub handler: fn() -> Handler,
}

inventory::collect!(RouteDeclaration);

impl RouteDeclaration {
    pub const fn new(module: &'static str, name: &'static str, handler: fn() -> Handler) -> Self {
        Self {
            module,
            name,
            handler,
        }
    }

    /// Whether this declaration lives in `module` or below it
    pub fn is_within(&self, module: &str) -> bool {
        self.module == module
            || self
                .module
                .strip_prefix(module)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// Declarations in `module` and its submodules, ordered by module then name.
pub fn declarations_in(module: &str) -> Vec<&'static RouteDeclaration> {
    let mut found: Vec<_> = inventory::iter::<RouteDeclaration>
        .into_iter()
        .filter(|d| d.is_within(module))
        .collect();
    found.sort_by(|a, b| (a.module, a.name).cmp(&(b.module, b.name)));
    found
}

/// Every declaration linked into the binary
pub fn all_declarations() -> Vec<&'static RouteDeclaration> {
    let mut found: Vec<_> = inventory::iter::<RouteDeclaration>.into_iter().collect();
    found.sort_by(|a, b| (a.module, a.name).cmp(&(b.module, b.name)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteTable;

    mod pages {
        use crate::{Arguments, Handler};

        pub fn about_route() -> Handler {
            Handler::new("about", |_args: Arguments| async { "about" }).get("/about")
        }

        pub fn contact_route() -> Handler {
            Handler::new("contact", |_args: Arguments| async { "contact" }).post("/contact")
        }

        inventory::submit! {
            crate::RouteDeclaration::new(module_path!(), "contact", contact_route)
        }
        inventory::submit! {
            crate::RouteDeclaration::new(module_path!(), "about", about_route)
        }

        pub mod nested {
            use crate::{Arguments, Handler};

            pub fn faq_route() -> Handler {
                Handler::new("faq", |_args: Arguments| async { "faq" }).get("/faq")
            }

            inventory::submit! {
                crate::RouteDeclaration::new(module_path!(), "faq", faq_route)
            }
        }
    }

    mod pages_archive {
        use crate::{Arguments, Handler};

        pub fn archive_route() -> Handler {
            Handler::new("archive", |_args: Arguments| async { "archive" }).get("/archive")
        }

        inventory::submit! {
            crate::RouteDeclaration::new(module_path!(), "archive", archive_route)
        }
    }

    #[test]
    fn test_scan_is_scoped_and_ordered() {
        let module = format!("{}::pages", module_path!());
        let names: Vec<_> = declarations_in(&module).iter().map(|d| d.name).collect();
        assert_eq!(names, ["about", "contact", "faq"]);
    }

    #[test]
    fn test_sibling_prefix_is_not_included() {
        let module = format!("{}::pages", module_path!());
        assert!(
            declarations_in(&module)
                .iter()
                .all(|d| d.name != "archive")
        );
        assert!(all_declarations().iter().any(|d| d.name == "archive"));
    }

    #[test]
    fn test_add_routes_registers_scanned_handlers() {
        let mut table = RouteTable::new();
        let added = table
            .add_routes(&format!("{}::pages", module_path!()))
            .unwrap();
        assert_eq!(added, 3);
        assert!(table.resolve("GET", "/about").is_ok());
        assert!(table.resolve("POST", "/contact").is_ok());

        // scanning again hits the duplicate check
        assert!(table.add_routes(&format!("{}::pages", module_path!())).is_err());
    }
}
