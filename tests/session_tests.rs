use std::collections::HashSet;
use std::sync::Arc;

use shefi::converter::{convert, Category};
use shefi::error::{SessionError, REGENERATION_FAILED_MESSAGE};
use shefi::fallback::fallback_recipes;
use shefi::gateway::ScriptedGateway;
use shefi::media::ImageSize;
use shefi::model::{Comment, CommentRole, RawRecipe, ASSISTANT_AUTHOR};
use shefi::session::Session;
use shefi::view::View;

fn generated_recipes() -> Vec<RawRecipe> {
    fallback_recipes()
        .into_iter()
        .map(|mut raw| {
            raw.title = raw.title.replace(" (backup recipe)", "");
            raw
        })
        .collect()
}

fn session_with(gateway: ScriptedGateway) -> (Session, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    (Session::new(gateway.clone(), ImageSize::default()), gateway)
}

async fn searched_session(gateway: ScriptedGateway) -> (Session, Arc<ScriptedGateway>) {
    let (mut session, gateway) = session_with(gateway.with_recipes(generated_recipes()));
    session.add_ingredient("eggs");
    session.add_ingredient("tomato");
    session.search().await.unwrap();
    (session, gateway)
}

#[tokio::test]
async fn test_search_returns_three_unique_fresh_recipes() {
    let (session, _) = searched_session(ScriptedGateway::offline()).await;
    let results = session.results();

    assert_eq!(results.len(), 3);
    let ids: HashSet<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(results.iter().all(|r| !r.is_favorite));
    assert!(results.iter().all(|r| r.id.starts_with("gen_")));
    assert!(results.iter().all(|r| r.image_url.is_some()));
}

#[tokio::test]
async fn test_failed_search_serves_fallback_recipes() {
    let (mut session, _) = session_with(ScriptedGateway::offline().rate_limited());
    session.add_ingredient("rice");
    let results = session.search().await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.id.starts_with("fallback_")));
    assert!(results[0].title.contains("backup recipe"));
}

#[tokio::test]
async fn test_search_without_ingredients_makes_no_call() {
    let (mut session, gateway) = session_with(ScriptedGateway::offline());
    let results = session.search().await.unwrap();
    assert!(results.is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_toggle_favorite_twice_restores_everything() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();
    session.open_recipe(&id).unwrap();

    assert!(session.toggle_favorite(&id).unwrap());
    assert_eq!(session.favorites().len(), 1);
    assert!(session.results()[0].is_favorite);
    assert!(session.active_recipe().unwrap().is_favorite);

    assert!(!session.toggle_favorite(&id).unwrap());
    assert!(session.favorites().is_empty());
    assert!(!session.results()[0].is_favorite);
    assert!(!session.active_recipe().unwrap().is_favorite);
}

#[tokio::test]
async fn test_toggle_unknown_recipe_is_an_error() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    assert!(matches!(
        session.toggle_favorite("gen_0_0"),
        Err(SessionError::RecipeNotFound(_))
    ));
}

#[tokio::test]
async fn test_comments_reach_every_copy() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[1].id.clone();
    session.toggle_favorite(&id).unwrap();
    session.open_recipe(&id).unwrap();

    let comment = Comment::new("Dana", "Added chili, great.");
    let comment_id = comment.id.clone();
    session.add_comment(&id, comment).unwrap();

    assert_eq!(session.results()[1].comments.len(), 1);
    assert_eq!(session.favorites()[0].comments.len(), 1);
    assert_eq!(session.active_recipe().unwrap().comments.len(), 1);

    session.delete_comment(&id, &comment_id).unwrap();
    assert!(session.results()[1].comments.is_empty());
    assert!(session.favorites()[0].comments.is_empty());
    assert!(session.active_recipe().unwrap().comments.is_empty());
}

#[tokio::test]
async fn test_regeneration_keeps_comments_and_favorite() {
    let mut substitute = generated_recipes().remove(2);
    substitute.title = "Dairy-free Salad".to_string();
    let (mut session, _) =
        searched_session(ScriptedGateway::offline().with_regenerated(substitute)).await;
    let id = session.results()[2].id.clone();
    session.toggle_favorite(&id).unwrap();
    session.add_comment(&id, Comment::user("Dana", "No feta at home")).unwrap();
    let comments_before = session.recipe(&id).unwrap().comments.clone();

    let regenerated = session.regenerate(&id, "feta").await.unwrap();

    assert_ne!(regenerated.id, id);
    assert!(regenerated.id.starts_with("mod_"));
    assert_eq!(regenerated.title, "Dairy-free Salad");
    assert_eq!(regenerated.comments, comments_before);
    assert_eq!(session.results()[2].id, regenerated.id);
    assert_eq!(session.favorites()[0].id, regenerated.id);
    assert!(session.favorites()[0].is_favorite);
    assert_eq!(session.favorites()[0].comments, comments_before);
}

#[tokio::test]
async fn test_failed_regeneration_leaves_original() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let before = session.results()[0].clone();

    let err = session.regenerate(&before.id, "eggs").await.unwrap_err();

    assert_eq!(err.user_message(), REGENERATION_FAILED_MESSAGE);
    assert_eq!(session.results()[0], before);
}

#[tokio::test]
async fn test_regeneration_needs_missing_ingredients() {
    let (mut session, gateway) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();
    let calls_before = gateway.calls().len();

    let err = session.regenerate(&id, "   ").await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyInput(_)));
    assert_eq!(gateway.calls().len(), calls_before);
}

#[tokio::test]
async fn test_back_from_favorite_only_recipe_returns_to_favorites() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();
    session.toggle_favorite(&id).unwrap();

    // New search with nothing to search for empties the live results.
    session.clear_all();
    session.search().await.unwrap();
    assert!(session.results().is_empty());

    session.navigate(View::Favorites).unwrap();
    session.open_recipe(&id).unwrap();
    assert_eq!(session.back(), &View::Favorites);
    assert!(session.active_recipe().is_none());
}

#[tokio::test]
async fn test_back_from_live_result_returns_home() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();
    session.toggle_favorite(&id).unwrap();

    session.navigate(View::Favorites).unwrap();
    session.open_recipe(&id).unwrap();
    assert_eq!(session.back(), &View::Home);
}

#[tokio::test]
async fn test_thread_pairs_reply_with_latest_question() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();

    session.add_comment(&id, Comment::new("Avi", "Can I bake it?")).unwrap();
    session.add_comment(&id, Comment::new("Bella", "Is it spicy?")).unwrap();
    session
        .add_comment(&id, Comment::new(ASSISTANT_AUTHOR, "Only a little."))
        .unwrap();

    let threads = session.message_threads();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].question.as_ref().unwrap().author, "Bella");
    assert_eq!(threads[0].recipe_id, id);
}

#[tokio::test]
async fn test_threads_list_favorites_once() {
    let (mut session, _) =
        searched_session(ScriptedGateway::offline().with_comment_reply("Enjoy!")).await;
    let id = session.results()[0].id.clone();
    session.toggle_favorite(&id).unwrap();
    session.submit_comment(&id, "Dana", "Yum").await.unwrap();

    let threads = session.message_threads();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].question.as_ref().unwrap().text, "Yum");
    assert_eq!(threads[0].reply.text, "Enjoy!");
}

#[tokio::test]
async fn test_user_named_like_assistant_is_not_a_reply() {
    let (mut session, _) =
        searched_session(ScriptedGateway::offline().with_comment_reply("Thank you!")).await;
    let id = session.results()[0].id.clone();

    let reply = session.submit_comment(&id, "Shefira", "Loved it").await.unwrap();

    let question = &session.recipe(&id).unwrap().comments[0];
    assert_eq!(question.role, CommentRole::User);
    assert_eq!(reply.in_reply_to.as_deref(), Some(question.id.as_str()));
    let threads = session.message_threads();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].question.as_ref().unwrap().author, "Shefira");
}

#[tokio::test]
async fn test_no_notification_while_messages_open() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();

    session.navigate(View::Messages).unwrap();
    session
        .add_comment(&id, Comment::new(ASSISTANT_AUTHOR, "Hello!"))
        .unwrap();
    assert!(!session.has_notification());

    session.navigate(View::Home).unwrap();
    session
        .add_comment(&id, Comment::new(ASSISTANT_AUTHOR, "Hello again!"))
        .unwrap();
    assert!(session.has_notification());

    session.navigate(View::Messages).unwrap();
    assert!(!session.has_notification());
}

#[tokio::test]
async fn test_user_comment_does_not_notify() {
    let (mut session, _) = searched_session(ScriptedGateway::offline()).await;
    let id = session.results()[0].id.clone();
    session.add_comment(&id, Comment::new("Dana", "Hi")).unwrap();
    assert!(!session.has_notification());
}

#[test]
fn test_converter_identities_and_round_trips() {
    assert_eq!(convert(Category::Temperature, 100.0, "c", "f").unwrap(), "212.0");
    assert_eq!(convert(Category::Temperature, 212.0, "f", "c").unwrap(), "100.0");
    assert_eq!(convert(Category::Weight, 1.0, "kg", "g").unwrap(), "1000");
    assert_eq!(convert(Category::Weight, 1000.0, "g", "kg").unwrap(), "1");
    assert_eq!(convert(Category::Volume, 3.0, "tsp", "tbsp").unwrap(), "1");
    assert_eq!(convert(Category::Volume, 1.0, "cup", "cup").unwrap(), "1");
    assert_eq!(convert(Category::Weight, 1.0, "lb", "oz").unwrap(), "16.00");
}
