mod common;

use common::{save_borrow, save_librarian, save_user, NOW};
use library_core::{open_db_in_memory, CrudRepository, RepoError, SqliteUserRepository, User};

#[test]
fn save_assigns_id_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("Ada", "Lovelace");
    user.email = Some("ada@example.org".to_string());
    let saved = repo.save(user).unwrap();

    assert!(saved.id.is_some());
    assert_eq!(repo.get(&saved.id.unwrap()).unwrap().unwrap(), saved);
    assert!(repo.get(&9_999).unwrap().is_none());
}

#[test]
fn save_with_existing_id_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let mut user = save_user(&conn, "Grace", "Hopper");

    user.email = Some("grace@example.org".to_string());
    repo.save(user.clone()).unwrap();

    assert_eq!(repo.all().unwrap(), vec![user]);
}

#[test]
fn all_is_ordered_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    save_user(&conn, "Zoe", "Martin");
    save_user(&conn, "Yann", "Bernard");
    save_user(&conn, "Adam", "Martin");

    let names: Vec<String> = repo
        .all()
        .unwrap()
        .into_iter()
        .map(|user| format!("{} {}", user.first_name, user.last_name))
        .collect();
    assert_eq!(names, vec!["Yann Bernard", "Adam Martin", "Zoe Martin"]);
}

#[test]
fn blank_names_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.save(User::new("  ", "Nobody")),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.all().unwrap().is_empty());
}

#[test]
fn delete_removes_user_without_borrows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let user = save_user(&conn, "Alan", "Turing");

    repo.delete(&user).unwrap();

    assert!(repo.get(&user.id.unwrap()).unwrap().is_none());
    assert!(matches!(
        repo.delete(&user),
        Err(RepoError::NotPersisted { entity: "user", .. })
    ));
    assert!(matches!(
        repo.delete(&User::new("Never", "Saved")),
        Err(RepoError::NotPersisted { id: None, .. })
    ));
}

#[test]
fn delete_user_with_borrows_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let user = save_user(&conn, "Barbara", "Liskov");
    let librarian = save_librarian(&conn, "LIB-7");
    save_borrow(&conn, &user, &librarian, &[], NOW, NOW);

    assert!(matches!(repo.delete(&user), Err(RepoError::Persistence(_))));
    assert!(repo.get(&user.id.unwrap()).unwrap().is_some());
}
