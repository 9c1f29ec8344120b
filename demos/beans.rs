use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dragon_beans::{marker, reflect, AppContext, Beans, BeansSettings, Config, Introspector};

marker!(pub Column);

#[derive(Debug, Default)]
struct Book {
    isbn: String,
    title: Option<String>,
    pages: Option<i32>,
}

reflect! {
    Book {
        #[mark(Column)] isbn: String,
        #[mark(Column)] title: Option<String>,
        pages: Option<i32>,
    }
}

#[derive(Debug)]
struct Catalog {
    page_size: u32,
}

mod services {
    pub struct Mailer;
    pub struct Indexer;
    dragon_beans::discoverable!(Mailer, Indexer);
}

fn main() -> Result<(), dragon_beans::Error> {
    let environment = Config::builder()
        .with_file("demos/beans.toml", true)
        .with_env("BOOKSHOP", "__")
        .load()?;
    let beans = Arc::new(Beans::with_settings(BeansSettings::from_environment(&environment)?));

    // Bootstrap binds the container later, on another thread.
    let bootstrap = {
        let beans = Arc::clone(&beans);
        thread::spawn(move || -> Result<(), dragon_beans::Error> {
            thread::sleep(Duration::from_millis(50));
            let ctx = AppContext::builder().with_environment(environment).build();
            beans.bind(Arc::new(ctx))?;
            let page_size = beans.get_property_as_or("store.page_size", 10)?;
            beans.register(Catalog { page_size })?;
            beans.register(services::Mailer)?;
            Ok(())
        })
    };

    let catalog = beans.of::<Catalog>()?;
    bootstrap.join().expect("bootstrap thread panicked")?;

    println!("{}", beans.get_property("app.greeting")?);
    println!("page size: {}", catalog.page_size);
    println!("currency: {}", beans.get_property_or("store.currency", "USD")?);

    let introspector = Introspector::new();
    let mut book = Book {
        isbn: "978-0".to_string(),
        ..Book::default()
    };
    introspector.set_value(&mut book, "title", "Dune")?;
    introspector.set_value(&mut book, "pages", "412")?;
    println!("book: {:?}", introspector.object_to_map(&book));

    let columns: Vec<_> = introspector
        .fields_by_annotation::<Book, Column>()
        .iter()
        .map(|field| field.name())
        .collect();
    println!("columns: {columns:?}");

    for entry in &beans.find_classes(module_path!())? {
        println!("not yet registered: {}", entry.path());
    }

    Ok(())
}
