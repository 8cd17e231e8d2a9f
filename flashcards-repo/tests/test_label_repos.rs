mod utils;

use flashcards_repo::card_repo::NewCard;
use flashcards_repo::label_repo::{LabelRepoError, NewLabel};
use rstest::rstest;
use utils::test_user::TestUser;
use utils::RepoType;

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_and_list_labels(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let test_user = TestUser::new(&repos.user_repo).await;
    let other_user = TestUser::new(&repos.user_repo).await;

    let verbs = repos
        .label_repo
        .create_label(test_user.id(), NewLabel::new("verbs".into()))
        .await
        .unwrap();
    let nouns = repos
        .label_repo
        .create_label(test_user.id(), NewLabel::new("nouns".into()))
        .await
        .unwrap();
    repos
        .label_repo
        .create_label(other_user.id(), NewLabel::new("other".into()))
        .await
        .unwrap();

    assert_eq!("verbs", verbs.name);
    assert_eq!(test_user.id(), verbs.user_id);

    let labels = repos.label_repo.get_labels(test_user.id()).await.unwrap();
    assert_eq!(vec![verbs.clone(), nouns], labels);

    let fetched = repos
        .label_repo
        .get_label(test_user.id(), verbs.id)
        .await
        .unwrap();
    assert_eq!(verbs, fetched);

    test_user.delete().await;
    other_user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_foreign_label_not_found(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let owner = TestUser::new(&repos.user_repo).await;
    let intruder = TestUser::new(&repos.user_repo).await;

    let label = repos
        .label_repo
        .create_label(owner.id(), NewLabel::new("private".into()))
        .await
        .unwrap();

    let get_result = repos.label_repo.get_label(intruder.id(), label.id).await;
    assert!(matches!(get_result, Err(LabelRepoError::LabelNotFound(id)) if id == label.id));

    let update_result = repos
        .label_repo
        .update_label(intruder.id(), label.id, NewLabel::new("mine now".into()))
        .await;
    assert!(matches!(update_result, Err(LabelRepoError::LabelNotFound(_))));

    let delete_result = repos.label_repo.delete_label(intruder.id(), label.id).await;
    assert!(matches!(delete_result, Err(LabelRepoError::LabelNotFound(_))));

    let unchanged = repos.label_repo.get_label(owner.id(), label.id).await.unwrap();
    assert_eq!(label, unchanged);

    owner.delete().await;
    intruder.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_label(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let test_user = TestUser::new(&repos.user_repo).await;

    let label = repos
        .label_repo
        .create_label(test_user.id(), NewLabel::new("draft".into()))
        .await
        .unwrap();
    let updated = repos
        .label_repo
        .update_label(test_user.id(), label.id, NewLabel::new("final".into()))
        .await
        .unwrap();
    assert_eq!(label.id, updated.id);
    assert_eq!("final", updated.name);

    let stored = repos
        .label_repo
        .get_label(test_user.id(), label.id)
        .await
        .unwrap();
    assert_eq!(updated, stored);

    test_user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_label_keeps_cards(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let test_user = TestUser::new(&repos.user_repo).await;

    let keep = repos
        .label_repo
        .create_label(test_user.id(), NewLabel::new("keep".into()))
        .await
        .unwrap();
    let dropped = repos
        .label_repo
        .create_label(test_user.id(), NewLabel::new("drop".into()))
        .await
        .unwrap();
    let card = repos
        .card_repo
        .create_card(
            test_user.id(),
            NewCard::new("hund".into(), "dog".into(), 2, vec![keep.id, dropped.id]),
        )
        .await
        .unwrap();

    let deleted = repos
        .label_repo
        .delete_label(test_user.id(), dropped.id)
        .await
        .unwrap();
    assert_eq!(dropped, deleted);

    let card = repos
        .card_repo
        .get_card(test_user.id(), card.id)
        .await
        .unwrap();
    assert_eq!(vec![keep.id], card.label_ids);

    test_user.delete().await;
}
