//! `GET /api/nav`: the site navigation bar.

/// Links shown in the mobile menu, in order.
const MOBILE_LINKS: &[(&str, &str)] = &[
    ("/earning", "Earning"),
    ("/crypto", "Crypto"),
    ("/shops", "Shops"),
    ("/profile", "Profile"),
    ("/business", "Business"),
];

pub fn handle_nav_get() -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(r#"<nav class="w-full bg-background border-b border-yellow-600">"#);
    html.push_str(r#"<div class="container mx-auto px-4 py-4 flex items-center justify-between">"#);
    html.push_str(
        r#"<a href="/"><span class="text-2xl font-extrabold text-yellow-300 cursor-pointer">Business Empire</span></a>"#,
    );

    // Desktop
    html.push_str(r#"<div class="hidden md:flex items-center space-x-6">"#);
    html.push_str(r#"<a href="/" class="flex items-center text-gray-300 hover:text-yellow-300 transition">Earning</a>"#);
    html.push_str("</div>");

    // Mobile toggle (client-side only)
    html.push_str(
        r#"<div class="md:hidden"><button type="button" class="text-gray-300 focus:outline-none" onclick="document.getElementById('mobile-menu').classList.toggle('hidden')">&#9776;</button></div>"#,
    );
    html.push_str("</div>");

    html.push_str(r#"<div id="mobile-menu" class="hidden md:hidden bg-gray-900 border-t border-yellow-600"><div class="px-4 py-4 space-y-2">"#);
    for (href, label) in MOBILE_LINKS {
        html.push_str(&format!(
            r#"<a href="{}" class="flex items-center block text-gray-300 hover:text-yellow-300 transition">{}</a>"#,
            href, label
        ));
    }
    html.push_str(
        r#"<button type="button" hx-post="/api/logout" hx-target="body" hx-swap="beforeend" class="flex items-center w-full text-left text-gray-300 hover:text-yellow-300 transition">Logout</button>"#,
    );
    html.push_str("</div></div></nav>");
    html
}
