use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    models::{EpisodeDetail, Movie, MovieSort},
    web::pages::{MovieForm, MovieListing},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const SWAGGER_UI_CDN: &str = "https://unpkg.com/swagger-ui-dist@5";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn login_page(from: Option<&str>, error: Option<&str>, username: &str) -> String {
    page(
        "Sign in",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-md w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Sign in" }
                        p class="mt-2 text-gray-600" { "Movies & TV Shows catalog" }

                        @if let Some(error) = error {
                            (alert(error))
                        }

                        form class="mt-8 space-y-6" method="post" action="/login" {
                            @if let Some(from) = from {
                                input type="hidden" name="from" value=(from);
                            }
                            div {
                                label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                                input class=(INPUT_CLASS) name="username" id="username" value=(username) autocomplete="username" required;
                            }
                            div {
                                label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                                input class=(INPUT_CLASS) type="password" name="password" id="password" autocomplete="current-password" required;
                            }
                            button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Sign in" }
                        }
                    }
                }
            }
        },
    )
}

pub fn home_page(docs_url: &str) -> String {
    page(
        "Dashboard",
        shell(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Dashboard" }
            p class="mt-2 text-gray-600" { "Browse the catalog or add a new movie." }

            div class="mt-8 grid gap-4 md:grid-cols-2" {
                a class="block bg-white shadow rounded-lg p-6 hover:shadow-md" href="/movies" {
                    h2 class="text-xl font-semibold text-gray-900" { "Movies" }
                    p class="mt-1 text-sm text-gray-500" { "Filter by genre, sort by title or year." }
                }
                a class="block bg-white shadow rounded-lg p-6 hover:shadow-md" href="/movies/new" {
                    h2 class="text-xl font-semibold text-gray-900" { "Add a movie" }
                    p class="mt-1 text-sm text-gray-500" { "Director and cast by id." }
                }
                a class="block bg-white shadow rounded-lg p-6 hover:shadow-md" href=(docs_url) target="_blank" rel="noopener" {
                    h2 class="text-xl font-semibold text-gray-900" { "API docs" }
                    p class="mt-1 text-sm text-gray-500" { "Swagger UI served by the catalog API." }
                }
            }
        }),
    )
}

pub fn movies_page(listing: &MovieListing) -> String {
    page(
        "Movies",
        shell(html! {
            div class="flex items-start justify-between gap-6" {
                h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                a class="text-sm text-blue-600 hover:text-blue-800" href="/movies/new" { "Add movie" }
            }

            form class="mt-6 flex flex-wrap items-end gap-4" method="get" action="/movies" {
                div {
                    label class="block text-sm font-medium text-gray-700" for="genre" { "Genre" }
                    input class=(INPUT_CLASS) name="genre" id="genre" value=(listing.genre);
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="sort" { "Sort" }
                    select class=(INPUT_CLASS) name="sort" id="sort" {
                        option value="" selected[listing.sort.is_none()] { "Default" }
                        @for sort in [MovieSort::Title, MovieSort::Year] {
                            option value=(sort.as_str()) selected[listing.sort == Some(sort)] { (sort.as_str()) }
                        }
                    }
                }
                button class=(BUTTON_CLASS) type="submit" { "Apply" }
            }

            @if listing.movies.is_empty() {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "No movies found." }
                }
            } @else {
                table class="mt-8 w-full bg-white shadow rounded-lg text-left text-sm" {
                    thead class="border-b text-gray-500" {
                        tr {
                            th class="px-4 py-3" { "Title" }
                            th class="px-4 py-3" { "Genre" }
                            th class="px-4 py-3" { "Year" }
                            th class="px-4 py-3" { "Director" }
                            th class="px-4 py-3" { "Cast" }
                        }
                    }
                    tbody {
                        @for movie in &listing.movies {
                            (movie_row(movie))
                        }
                    }
                }

                nav class="mt-6 flex items-center justify-between text-sm" {
                    @if listing.page > 1 {
                        a class="text-blue-600 hover:text-blue-800" href=(listing.page_href(listing.page - 1)) { "Previous" }
                    } @else {
                        span {}
                    }
                    span class="text-gray-500" { "Page " (listing.page) " of " (listing.total_pages) }
                    @if listing.page < listing.total_pages {
                        a class="text-blue-600 hover:text-blue-800" href=(listing.page_href(listing.page + 1)) { "Next" }
                    } @else {
                        span {}
                    }
                }
            }
        }),
    )
}

pub fn new_movie_page(form: &MovieForm, error: Option<&str>) -> String {
    page(
        "Add movie",
        shell(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Add movie" }

            @if let Some(error) = error {
                (alert(error))
            }

            form class="mt-8 space-y-6 bg-white shadow rounded-lg p-8" method="post" action="/movies/new" {
                (field("title", "Title", &form.title, "text", true))
                (field("genre", "Genre", &form.genre, "text", true))
                (field("year", "Year", &form.year, "number", false))
                (field("directorId", "Director id", &form.director_id, "number", true))
                div {
                    (field("actorIds", "Actor ids", &form.actor_ids, "text", false))
                    p class="mt-2 text-xs text-gray-500" { "Comma separated, e.g. 1, 4, 7." }
                }
                button class=(BUTTON_CLASS) type="submit" { "Create" }
            }
        }),
    )
}

pub fn episode_page(episode: &EpisodeDetail) -> String {
    let show = &episode.season.show;
    page(
        &episode.title,
        shell(html! {
            p class="text-sm text-gray-500" { (show.title) " · " (show.genre) }
            h1 class="mt-1 text-3xl font-bold text-gray-900" { (episode.title) }

            dl class="mt-8 grid grid-cols-2 gap-4 bg-white shadow rounded-lg p-6 text-sm" {
                dt class="text-gray-500" { "Season" }
                dd class="text-gray-900" { (episode.season.season_number) }
                dt class="text-gray-500" { "Episode" }
                dd class="text-gray-900" { (episode.episode_number) }
                dt class="text-gray-500" { "Director" }
                dd class="text-gray-900" { (episode.director.name) }
            }
        }),
    )
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

/// Swagger UI pointed at the API's own OpenAPI document.
pub fn api_docs_page(spec_url: &str) -> String {
    let boot = format!(
        "window.ui = SwaggerUIBundle({{ url: {}, dom_id: '#swagger-ui' }});",
        serde_json::Value::from(spec_url)
    );
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Movies & TV Shows API" }
                link rel="stylesheet" href=(format!("{SWAGGER_UI_CDN}/swagger-ui.css"));
            }
            body {
                div id="swagger-ui" {}
                script src=(format!("{SWAGGER_UI_CDN}/swagger-ui-bundle.js")) {}
                script { (PreEscaped(boot)) }
            }
        }
    }
    .into_string()
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

/// Signed-in layout with navigation and a logout button.
fn shell(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50" {
            header class="bg-white shadow" {
                div class="max-w-4xl mx-auto px-6 py-4 flex items-center gap-6 text-sm" {
                    a class="font-semibold text-gray-900" href="/" { "Catalog" }
                    a class="text-gray-600 hover:text-gray-900" href="/movies" { "Movies" }
                    a class="text-gray-600 hover:text-gray-900" href="/movies/new" { "Add movie" }
                    form class="ml-auto" method="post" action="/logout" {
                        button class="text-gray-600 hover:text-gray-900" type="submit" { "Log out" }
                    }
                }
            }
            main class="max-w-4xl mx-auto px-6 py-10" { (inner) }
        }
    }
}

fn alert(message: &str) -> Markup {
    html! {
        div class="mt-6 rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700" role="alert" {
            (message)
        }
    }
}

fn field(name: &str, label: &str, value: &str, kind: &str, required: bool) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type=(kind) name=(name) id=(name) value=(value) required[required];
        }
    }
}

fn movie_row(movie: &Movie) -> Markup {
    html! {
        tr class="border-b last:border-0" {
            td class="px-4 py-3 font-medium text-gray-900" { (movie.title) }
            td class="px-4 py-3 text-gray-700" { (movie.genre) }
            td class="px-4 py-3 text-gray-700" { (movie.year) }
            td class="px-4 py-3 text-gray-700" { (movie.director.name) }
            td class="px-4 py-3 text-gray-500" {
                @for (i, actor) in movie.actors.iter().enumerate() {
                    @if i > 0 { ", " }
                    (actor.name)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_escapes_catalog_text() {
        let html = error_page("<script>alert(1)</script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn login_keeps_return_path() {
        let html = login_page(Some("/movies?page=2"), None, "");
        assert!(html.contains(r#"name="from""#));
        assert!(html.contains("/movies?page=2"));
    }

    #[test]
    fn docs_page_boots_swagger_against_the_document() {
        let html = api_docs_page("/docs/openapi.json");
        assert!(html.contains(r#"id="swagger-ui""#));
        assert!(html.contains(r#"url: "/docs/openapi.json""#));
    }

    #[test]
    fn dashboard_links_to_the_api_docs() {
        let html = home_page("http://api.test/docs");
        assert!(html.contains(r#"href="http://api.test/docs""#));
    }
}
