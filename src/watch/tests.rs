use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use url::Url;

use super::{NodeHandler, Reconciler, Target, Watcher, collect_targets, sweep_media, sweep_table_links};
use crate::dom::{Document, MutationObserver, NodeExt, NodeRef, Selector, SharedDocument};
use crate::inline::TableInliner;
use crate::testing::{StaticFetcher, fragment, local, table_page};

/// Records every call, in order.
#[derive(Default)]
struct CountingHandler {
    calls: RefCell<Vec<Target>>,
}

impl CountingHandler {
    fn calls(&self) -> Vec<Target> {
        self.calls.borrow().clone()
    }

    fn count(&self, node: &NodeRef) -> usize {
        self.calls().iter().filter(|t| t.node() == node).count()
    }
}

impl NodeHandler for CountingHandler {
    fn on_media(&self, node: &NodeRef) {
        self.calls.borrow_mut().push(Target::Media(node.clone()));
    }

    fn on_table_link(&self, link: &NodeRef) {
        self.calls.borrow_mut().push(Target::TableLink(link.clone()));
    }
}

fn shared(html: &str) -> SharedDocument {
    Document::parse(html).into_shared()
}

fn watcher(doc: &SharedDocument) -> (Watcher, Rc<CountingHandler>) {
    let handler = Rc::new(CountingHandler::default());
    let observer = MutationObserver::observe(doc, doc.body());
    (Watcher::new(observer, handler.clone()), handler)
}

fn first(scope: &NodeRef, selector: &str) -> NodeRef {
    Selector::parse(selector).unwrap().select_first(scope).unwrap()
}

#[tokio::test]
async fn test_inserted_img_processed_once() {
    let doc = shared("<html><body><main></main></body></html>");
    let (watcher, handler) = watcher(&doc);

    let main = first(doc.root(), "main");
    let img = fragment(r#"<img src="https://media.springernature.com/lw685/a.png">"#);
    doc.append_child(&main, img.clone());

    assert_eq!(watcher.step().await, 1);
    assert_eq!(handler.calls(), [Target::Media(img)]);
}

#[tokio::test]
async fn test_inserted_subtree_processed_exactly_once() {
    let doc = shared("<html><body></body></html>");
    let (watcher, handler) = watcher(&doc);

    let section = fragment(
        r#"<section>
             <img src="/lw100/a.png"><p><img src="/lw100/b.png"></p>
             <picture><source srcset="/lw200/c.png 2x"><img src="/lw100/c.png"></picture>
             <figure><a data-track-action="view table" href="/tables/1">Full size table</a></figure>
           </section>"#,
    );
    doc.append_child(&doc.body(), section.clone());

    assert_eq!(watcher.step().await, 5);

    let calls = handler.calls();
    let media = calls.iter().filter(|t| matches!(t, Target::Media(_))).count();
    let links = calls.iter().filter(|t| matches!(t, Target::TableLink(_))).count();
    assert_eq!((media, links), (4, 1));
    for target in &calls {
        assert_eq!(handler.count(target.node()), 1);
        assert!(target.node().ancestors().any(|a| a == section));
    }
}

#[tokio::test]
async fn test_nested_roots_in_one_batch_deduplicated() {
    let doc = shared("<html><body></body></html>");
    let (watcher, handler) = watcher(&doc);

    let outer = fragment("<div></div>");
    doc.append_child(&doc.body(), outer.clone());
    let img = fragment("<img>");
    // Recorded as its own root, and again reachable through `outer`.
    doc.append_child(&outer, img.clone());

    assert_eq!(watcher.step().await, 1);
    assert_eq!(handler.count(&img), 1);
}

#[test]
fn test_detached_root_skipped() {
    let doc = Document::parse("<html><body></body></html>");
    let img = fragment("<img>");
    doc.append_child(&doc.body(), img.clone());
    img.detach();

    assert!(collect_targets(&doc, &[img]).is_empty());
}

#[test]
fn test_table_link_root_not_scanned() {
    let doc = Document::parse(
        r#"<body><a data-test="table-link" href="/tables/2"><img src="/lw50/icon.png"></a></body>"#,
    );
    let link = first(doc.root(), "a");

    assert_eq!(collect_targets(&doc, &[link.clone()]).as_slice(), [Target::TableLink(link)]);
}

#[test]
fn test_text_and_plain_roots_ignored() {
    let doc = Document::parse("<body><p>hello</p></body>");
    let text = NodeRef::new_text("late text");
    doc.append_child(&doc.body(), text.clone());
    let p = first(doc.root(), "p");

    assert!(collect_targets(&doc, &[text, p]).is_empty());
}

#[test]
fn test_initial_sweeps() {
    let doc = Document::parse(
        r#"<html><head><link rel="icon" href="/lw16/icon.png"></head><body>
             <img src="/lw100/a.png"><img src="/b.png">
             <picture><source srcset="/lw400/c.png 400w"><img src="/lw100/c.png"></picture>
             <figure><a data-track-action="view table" href="/tables/1">t</a></figure>
             <div class="c-article-table"><a data-test="table-link" href="/tables/2">t</a></div>
           </body></html>"#,
    );
    let handler = CountingHandler::default();

    let counts = sweep_media(&doc, &handler);
    assert_eq!((counts.images, counts.sources), (3, 1));
    assert_eq!(sweep_table_links(&doc, &handler), 2);
    assert_eq!(handler.calls().len(), 6);
}

#[tokio::test]
async fn test_reconciler_enhances_and_inlines() {
    local(async {
        let doc = shared(
            r#"<html><body><figure><table id="summary"></table>
                 <a data-track-action="view table" href="/articles/x/tables/1">Full size table</a>
               </figure></body></html>"#,
        );
        let fetcher = Arc::new(
            StaticFetcher::new().page("https://www.nature.com/articles/x/tables/1", &table_page("full-1")),
        );
        let inliner = Rc::new(TableInliner::new(
            doc.clone(),
            fetcher.clone(),
            Some(Url::parse("https://www.nature.com/articles/x").unwrap()),
        ));
        let reconciler = Reconciler::new(inliner.clone());

        let img = fragment(
            r#"<img src="https://media.springernature.com/lw685/a.png" srcset="https://media.springernature.com/lw200/a.png 200w">"#,
        );
        doc.append_child(&doc.body(), img.clone());
        sweep_media(&doc, &reconciler);
        sweep_table_links(&doc, &reconciler);
        inliner.settled().await;

        assert_eq!(img.attr("src").as_deref(), Some("https://media.springernature.com/full/a.png"));
        assert_eq!(
            img.attr("srcset").as_deref(),
            Some("https://media.springernature.com/full/a.png 200w")
        );
        let tables = Selector::parse("table").unwrap().select_all(doc.root());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].attr("id").as_deref(), Some("full-1"));
        assert_eq!(fetcher.calls().len(), 1);
    })
    .await;
}
