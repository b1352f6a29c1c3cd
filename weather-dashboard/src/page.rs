//! Home page markup.

use std::fmt::Write;

use weather_core::FavoriteCity;

/// Render the dashboard page for `default_city` and the saved favorites.
pub fn render_index(default_city: &str, favorites: &[FavoriteCity]) -> String {
    let city = escape_html(default_city);

    let mut items = String::new();
    for favorite in favorites {
        let name = escape_html(&favorite.city_name);
        // writing into a String cannot fail
        let _ = write!(
            items,
            r#"
        <li>
          <a href="/weather?city={query}">{name}</a>
          <form method="post" action="/favorites/remove/{id}"><button type="submit">Remove</button></form>
        </li>"#,
            query = escape_html(&urlencoding::encode(&favorite.city_name)),
            id = favorite.id,
        );
    }
    if favorites.is_empty() {
        items.push_str("\n        <li>No favorite cities yet.</li>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Weather Dashboard</title>
</head>
<body>
  <h1>Weather Dashboard</h1>
  <form method="get" action="/weather">
    <input type="text" name="city" value="{city}" data-default-city="{city}" required>
    <button type="submit">Search</button>
  </form>
  <form method="post" action="/favorites/add">
    <input type="text" name="city_name" placeholder="City" required>
    <button type="submit">Save favorite</button>
  </form>
  <section>
    <h2>Favorite cities</h2>
    <ul id="favorites">{items}
    </ul>
  </section>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
