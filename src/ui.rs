use crate::card::{Occupancy, TableCard, FREE_MARKUP, OCCUPIED_MARKUP};
use crate::models::{BoardData, Table};

pub fn render_index(csrf_token: &str, data: &BoardData) -> String {
    let cards: String = data.ordered().into_iter().map(render_card).collect();
    INDEX_HTML
        .replace("{{CSRF}}", &escape_attr(csrf_token))
        .replace("{{CARDS}}", &cards)
        .replace("{{OCCUPIED_MARKUP}}", OCCUPIED_MARKUP)
        .replace("{{FREE_MARKUP}}", FREE_MARKUP)
}

pub fn render_card(table: &Table) -> String {
    let card = TableCard::rendered(
        table.id.to_string(),
        Occupancy::from_occupied(table.is_occupied),
    );
    format!(
        r#"
      <div class="{classes}" data-id="{id}">
        <span class="number">Mesa {number}</span>
        <span class="status-indicator">{status}</span>
      </div>"#,
        classes = card.class_attr(),
        id = card.id(),
        number = table.number,
        status = card.status_html(),
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mesas</title>
  <style>
    :root {
      --bg: #f7f4ee;
      --ink: #2b2a28;
      --free: #2d7a4b;
      --occupied: #c63b2b;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 24px;
    }

    .board {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(140px, 1fr));
      gap: 16px;
    }

    .table-card {
      background: white;
      border-radius: 16px;
      padding: 18px;
      display: grid;
      gap: 8px;
      cursor: pointer;
      border: 2px solid transparent;
      user-select: none;
    }

    .table-card.free {
      border-color: var(--free);
    }

    .table-card.occupied {
      border-color: var(--occupied);
      background: #fbe9e6;
    }

    .number {
      font-size: 1.3rem;
      font-weight: 600;
    }
  </style>
</head>
<body>
  <header>
    <h1>Mesas</h1>
    <button id="add-table" type="button">Nueva mesa</button>
  </header>

  <input type="hidden" name="csrfmiddlewaretoken" value="{{CSRF}}" />

  <main class="board">{{CARDS}}
  </main>

  <script>
    document.addEventListener('DOMContentLoaded', () => {
      const csrfToken = document.querySelector('[name=csrfmiddlewaretoken]').value;

      document.querySelectorAll('.table-card').forEach((card) => {
        card.addEventListener('click', () => {
          const tableId = card.getAttribute('data-id');
          const statusSpan = card.querySelector('.status-indicator');

          fetch(`/toggle/${tableId}/`, {
            method: 'POST',
            headers: {
              'Content-Type': 'application/json',
              'X-CSRFToken': csrfToken
            }
          })
            .then((response) => {
              if (!response.ok) {
                throw new Error(`toggle failed with ${response.status}`);
              }
              return response.json();
            })
            .then((data) => {
              if (typeof data.is_occupied !== 'boolean') {
                throw new Error('toggle response has no is_occupied flag');
              }
              if (data.is_occupied) {
                card.classList.remove('free');
                card.classList.add('occupied');
                statusSpan.innerHTML = '{{OCCUPIED_MARKUP}}';
              } else {
                card.classList.remove('occupied');
                card.classList.add('free');
                statusSpan.innerHTML = '{{FREE_MARKUP}}';
              }
            })
            .catch((error) => console.error('Error:', error));
        });
      });

      document.getElementById('add-table').addEventListener('click', () => {
        fetch('/create/', {
          method: 'POST',
          headers: { 'X-CSRFToken': csrfToken }
        })
          .then(() => window.location.reload())
          .catch((error) => console.error('Error:', error));
      });
    });
  </script>
</body>
</html>
"#;
