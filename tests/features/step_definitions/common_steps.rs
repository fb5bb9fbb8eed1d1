//! Common step definitions used across features

use cucumber::{given, then};

use crate::features::support::TestWorld;

#[given(expr = "I am signed in as {word}")]
async fn signed_in_as(world: &mut TestWorld, who: String) {
    world.sign_in_as(&who);
}

#[given("I am not signed in")]
async fn not_signed_in(world: &mut TestWorld) {
    world.auth_token = None;
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    assert_eq!(
        world.response().status,
        status,
        "Body: {}",
        world.response().body
    );
}

#[then(expr = "the error message should be {string}")]
async fn error_message(world: &mut TestWorld, message: String) {
    assert_eq!(world.response().body["message"], message.as_str());
}
