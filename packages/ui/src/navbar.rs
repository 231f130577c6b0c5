use dioxus::prelude::*;

#[component]
pub fn Navbar(#[props(default = "".to_string())] class: String, children: Element) -> Element {
    rsx! {
        nav {
            class: "navbar {class}",
            {children}
        }
    }
}
