use contacts_types::Contact;

/// Demo contacts loaded when seeding is enabled.
pub fn seed_contacts() -> Vec<Contact> {
    vec![
        Contact::new("Jan", "Kowalski", Some("jkowalski@u.pl".to_string()))
            .with_phone("111-111-1111", Some("Domowy".to_string()))
            .with_phone("222-222-2222", Some("Służbowy".to_string())),
        Contact::new("Adam", "Nowak", Some("anowak@u.pl".to_string())),
    ]
}
