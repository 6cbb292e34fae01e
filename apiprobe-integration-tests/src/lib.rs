//! Shared infrastructure for the scenario suite: an in-process stand-in
//! for the mock REST API, mounted with the five nested resource routes
//! plus a health route, serving static fixture JSON.
//!
//! Routes follow the mock server's contract: JSON arrays filtered by the
//! path parameter, 404 with an error body when the id is unknown or
//! non-numeric, 500 with an error body on internal failure.

use serde_json::{json, Value};

/// Initialize tracing output for the suite. Safe to call from every test;
/// only the first call wins. Enable with `RUST_LOG=debug`.
pub fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn comments_for_post_1() -> Value {
    json!([
        {
            "id": 1,
            "postId": 1,
            "name": "id labore ex et quam laborum",
            "email": "eliseo@gardner.biz",
            "body": "laudantium enim quasi est quidem magnam voluptate"
        },
        {
            "id": 2,
            "postId": 1,
            "name": "quo vero reiciendis velit similique earum",
            "email": "jayne_kuhic@sydney.com",
            "body": "est natus enim nihil est dolore omnis voluptatem numquam"
        },
        {
            "id": 3,
            "postId": 1,
            "name": "odio adipisci rerum aut animi",
            "email": "nikita@garfield.biz",
            "body": "quia molestiae reprehenderit quasi aspernatur"
        }
    ])
}

/// Comments for post 2 where the middle item references the wrong post.
pub fn inconsistent_comments_for_post_2() -> Value {
    json!([
        {
            "id": 6,
            "postId": 2,
            "name": "et fugit eligendi deleniti quidem qui sint nihil autem",
            "email": "presley.mueller@myrl.com",
            "body": "doloribus at sed quis culpa deserunt consectetur"
        },
        {
            "id": 7,
            "postId": 1,
            "name": "repellat consequatur praesentium vel minus",
            "email": "dallas@ole.me",
            "body": "maiores sed dolores similique labore et inventore"
        },
        {
            "id": 8,
            "postId": 2,
            "name": "et omnis dolorem",
            "email": "mallory_kunze@marie.org",
            "body": "ut voluptatem corrupti velit"
        }
    ])
}

pub fn photos_for_album_1() -> Value {
    json!([
        {
            "id": 1,
            "albumId": 1,
            "title": "accusamus beatae ad facilis cum similique qui sunt",
            "url": "https://via.placeholder.com/600/92c952",
            "thumbnailUrl": "https://via.placeholder.com/150/92c952"
        },
        {
            "id": 2,
            "albumId": 1,
            "title": "reprehenderit est deserunt velit ipsam",
            "url": "https://via.placeholder.com/600/771796",
            "thumbnailUrl": "https://via.placeholder.com/150/771796"
        }
    ])
}

pub fn albums_for_user_1() -> Value {
    json!([
        {"id": 1, "userId": 1, "title": "quidem molestiae enim"},
        {"id": 2, "userId": 1, "title": "sunt qui excepturi placeat culpa"}
    ])
}

pub fn todos_for_user_1() -> Value {
    json!([
        {"id": 1, "userId": 1, "title": "delectus aut autem", "completed": false},
        {"id": 2, "userId": 1, "title": "quis ut nam facilis et officia qui", "completed": true}
    ])
}

pub fn posts_for_user_1() -> Value {
    json!([
        {
            "id": 1,
            "userId": 1,
            "title": "sunt aut facere repellat provident",
            "body": "quia et suscipit recusandae consequuntur"
        },
        {
            "id": 2,
            "userId": 1,
            "title": "qui est esse",
            "body": "est rerum tempore vitae sequi sint nihil"
        }
    ])
}

/// The mock API, alive for as long as this value is.
pub struct MockApi {
    server: mockito::ServerGuard,
    // keep the route handles alive alongside the server
    _mocks: Vec<mockito::Mock>,
}

impl MockApi {
    pub async fn start() -> MockApi {
        init_logging();

        let mut server = mockito::Server::new_async().await;
        let mut mocks = Vec::new();

        let mount = |server: &mut mockito::ServerGuard, path: &str, status, body: String| {
            server
                .mock("GET", path)
                .with_status(status)
                .with_header("content-type", "application/json")
                .with_body(body)
        };

        let routes = [
            ("/health", 200, json!({"status": "ok"})),
            ("/posts/1/comments", 200, comments_for_post_1()),
            ("/posts/2/comments", 200, inconsistent_comments_for_post_2()),
            ("/posts/77/comments", 200, json!([])),
            ("/posts/invalid/comments", 404, json!({"error": "invalid post id"})),
            ("/posts/999/comments", 404, json!({"error": "no comments found for post 999"})),
            ("/albums/1/photos", 200, photos_for_album_1()),
            ("/users/1/albums", 200, albums_for_user_1()),
            ("/users/1/todos", 200, todos_for_user_1()),
            ("/users/1/posts", 200, posts_for_user_1()),
            ("/explode", 500, json!({"error": "internal server error"})),
        ];
        for (path, status, body) in routes {
            let mock = mount(&mut server, path, status, body.to_string())
                .create_async()
                .await;
            mocks.push(mock);
        }

        // the one route that violates the JSON contract
        let broken = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_body("this is not json")
            .create_async()
            .await;
        mocks.push(broken);

        MockApi {
            server,
            _mocks: mocks,
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn client(&self) -> apiprobe_core::Client {
        apiprobe_core::Client::new(self.server.url())
    }
}
